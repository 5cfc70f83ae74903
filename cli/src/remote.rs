use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use sprout_core::remote::{
    Ack, AddMealRequest, AddMealResponse, CalorieRemote, GoalRequest, RemoteError, TodayResponse,
};

pub const USER_HEADER: &str = "x-user-id";

/// HTTP client for the remote calorie service, bound to one user.
pub struct HttpCalorieService {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl HttpCalorieService {
    pub fn new(base_url: &str, user_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("sprout/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(USER_HEADER, &self.user_id)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn check(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(RemoteError::RateLimited),
        _ => {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |b| b.error);
            Err(RemoteError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    resp.json()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

fn unavailable(err: reqwest::Error) -> RemoteError {
    RemoteError::Unavailable(err.to_string())
}

#[async_trait]
impl CalorieRemote for HttpCalorieService {
    async fn today(&self) -> Result<TodayResponse, RemoteError> {
        let resp = self
            .request(reqwest::Method::GET, "/calories/today")
            .send()
            .await
            .map_err(unavailable)?;
        decode(check(resp).await?).await
    }

    async fn add_meal(&self, request: &AddMealRequest) -> Result<AddMealResponse, RemoteError> {
        let resp = self
            .request(reqwest::Method::POST, "/calories/add-meal")
            .json(request)
            .send()
            .await
            .map_err(unavailable)?;
        decode(check(resp).await?).await
    }

    async fn set_goal(&self, daily_goal: u32) -> Result<(), RemoteError> {
        let resp = self
            .request(reqwest::Method::PUT, "/calories/goal")
            .json(&GoalRequest { daily_goal })
            .send()
            .await
            .map_err(unavailable)?;
        let _: Ack = decode(check(resp).await?).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        let resp = self
            .request(reqwest::Method::POST, "/calories/reset")
            .send()
            .await
            .map_err(unavailable)?;
        let _: Ack = decode(check(resp).await?).await?;
        Ok(())
    }
}
