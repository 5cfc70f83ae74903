//! Contract of the remote calorie service the sync coordinator talks to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MealCategory, MealEntry, MealSource};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote service unreachable: {0}")]
    Unavailable(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMeal {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub calories: u32,
    pub category: MealCategory,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: MealSource,
}

impl RemoteMeal {
    /// Convert to a local entry; rows without an id or timestamp get fresh
    /// ones.
    #[must_use]
    pub fn into_entry(self, fallback_timestamp: DateTime<Utc>) -> MealEntry {
        MealEntry {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            category: self.category,
            timestamp: self.timestamp.unwrap_or(fallback_timestamp),
            source: self.source,
        }
    }
}

impl From<&MealEntry> for RemoteMeal {
    fn from(entry: &MealEntry) -> Self {
        Self {
            id: Some(entry.id.clone()),
            name: entry.name.clone(),
            calories: entry.calories,
            category: entry.category,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            timestamp: Some(entry.timestamp),
            source: entry.source,
        }
    }
}

/// `GET /calories/today`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub total_calories: u64,
    pub daily_goal: u32,
    pub meals: Vec<RemoteMeal>,
}

/// `POST /calories/add-meal`. `client_id` lets the server recognise a
/// replayed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealRequest {
    pub name: String,
    pub calories: u32,
    pub category: MealCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: MealSource,
}

impl From<&MealEntry> for AddMealRequest {
    fn from(entry: &MealEntry) -> Self {
        Self {
            name: entry.name.clone(),
            calories: entry.calories,
            category: entry.category,
            client_id: Some(entry.id.clone()),
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            timestamp: Some(entry.timestamp),
            source: entry.source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieEntry {
    pub total_calories: u64,
    pub meals: Vec<RemoteMeal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealResponse {
    pub success: bool,
    pub calorie_entry: CalorieEntry,
}

/// `PUT /calories/goal`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub daily_goal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

/// Remote persistence for one authenticated user. Implementations carry the
/// user identifier themselves.
#[async_trait]
pub trait CalorieRemote: Send + Sync {
    async fn today(&self) -> Result<TodayResponse, RemoteError>;
    async fn add_meal(&self, request: &AddMealRequest) -> Result<AddMealResponse, RemoteError>;
    async fn set_goal(&self, daily_goal: u32) -> Result<(), RemoteError>;
    async fn reset(&self) -> Result<(), RemoteError>;
}
