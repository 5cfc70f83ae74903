use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use chrono::{DateTime, Utc};
use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use sprout_core::entries::EntryStore;
use sprout_core::models::{MealCategory, MealSource, NewMealEntry};
use sprout_core::remote::{Ack, AddMealResponse, CalorieEntry, RemoteMeal, TodayResponse};
use sprout_core::store::SqliteStore;

use crate::remote::USER_HEADER;

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

type UserStore = Arc<Mutex<EntryStore<SqliteStore>>>;

/// Where per-user state lives.
#[derive(Clone)]
pub enum Backing {
    File(PathBuf),
    Memory,
}

#[derive(Clone)]
struct AppState {
    backing: Backing,
    users: Arc<Mutex<HashMap<String, UserStore>>>,
}

impl AppState {
    fn new(backing: Backing) -> Self {
        Self {
            backing,
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// One store per user, opened on first use and kept for the life of the
    /// server.
    fn user_store(&self, user: &UserId) -> Result<UserStore, ApiError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = users.get(&user.0) {
            return Ok(Arc::clone(store));
        }
        let kv = match &self.backing {
            Backing::File(path) => SqliteStore::open_namespaced(path, &format!("user:{}", user.0)),
            Backing::Memory => SqliteStore::open_in_memory(),
        }
        .context("failed to open user store")?;
        let store = Arc::new(Mutex::new(EntryStore::new(kv)));
        users.insert(user.0.clone(), Arc::clone(&store));
        tracing::debug!(user = %user.0, "opened user store");
        Ok(store)
    }
}

#[derive(Clone)]
struct UserId(String);

// --- Request / Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddMealBody {
    name: String,
    calories: f64,
    category: MealCategory,
    client_id: Option<String>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    /// When the meal was eaten, for entries flushed after going offline.
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    source: MealSource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalBody {
    daily_goal: i64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<sprout_core::Error> for ApiError {
    fn from(err: sprout_core::Error) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.into())
        }
    }
}

// --- Middleware ---

async fn require_user(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let Some(user) = user else {
        return ApiError::Unauthorized(format!("Missing {USER_HEADER} header")).into_response();
    };
    request.extensions_mut().insert(UserId(user));
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

fn remote_meals(entries: &EntryStore<SqliteStore>) -> Result<Vec<RemoteMeal>, ApiError> {
    Ok(entries.list_today()?.iter().map(RemoteMeal::from).collect())
}

async fn get_today(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> Result<Json<TodayResponse>, ApiError> {
    let store = state.user_store(&user)?;
    let entries = store.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(Json(TodayResponse {
        total_calories: entries.consumed_today()?,
        daily_goal: entries.daily_goal()?,
        meals: remote_meals(&entries)?,
    }))
}

async fn add_meal(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Json(body): Json<AddMealBody>,
) -> Result<Json<AddMealResponse>, ApiError> {
    let store = state.user_store(&user)?;
    let entries = store.lock().unwrap_or_else(PoisonError::into_inner);

    let mut entry = entries.prepare(NewMealEntry {
        name: body.name,
        calories: body.calories,
        protein: body.protein,
        carbs: body.carbs,
        fat: body.fat,
        category: body.category,
        source: body.source,
    })?;

    // A timestamp ahead of the server clock falls back to it
    if let Some(eaten_at) = body.timestamp.filter(|ts| *ts <= entry.timestamp) {
        entry.timestamp = eaten_at;
    }

    let replayed = match body.client_id {
        Some(client_id) => {
            let seen = entries.contains(&client_id)?;
            entry.id = client_id;
            seen
        }
        None => false,
    };

    if replayed {
        tracing::info!(user = %user.0, id = %entry.id, "replayed meal acknowledged");
    } else {
        entries.commit(entry.clone())?;
        tracing::info!(user = %user.0, id = %entry.id, calories = entry.calories, "meal added");
    }

    Ok(Json(AddMealResponse {
        success: true,
        calorie_entry: CalorieEntry {
            total_calories: entries.consumed_today()?,
            meals: remote_meals(&entries)?,
        },
    }))
}

async fn set_goal(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Json(body): Json<GoalBody>,
) -> Result<Json<Ack>, ApiError> {
    let store = state.user_store(&user)?;
    let entries = store.lock().unwrap_or_else(PoisonError::into_inner);
    let goal = entries.set_goal(body.daily_goal)?;
    tracing::info!(user = %user.0, goal, "daily goal set");
    Ok(Json(Ack { success: true }))
}

async fn reset_today(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> Result<Json<Ack>, ApiError> {
    let store = state.user_store(&user)?;
    let entries = store.lock().unwrap_or_else(PoisonError::into_inner);
    entries.reset_today()?;
    tracing::info!(user = %user.0, "today reset");
    Ok(Json(Ack { success: true }))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/calories/today", get(get_today))
        .route("/calories/add-meal", post(add_meal))
        .route("/calories/goal", put(set_goal))
        .route("/calories/reset", post(reset_today))
        .route_layer(middleware::from_fn(require_user))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(backing: Backing, port: u16, bind: &str) -> anyhow::Result<()> {
    let app = build_router(AppState::new(backing));

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            %bind,
            "listening beyond loopback; the {USER_HEADER} header is trusted as-is"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
