use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_DAILY_GOAL: u32 = 2000;

/// Meal-time category shared by the catalog, the entry log, and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Tags from older catalog revisions (goal-based and regional taxonomies).
/// They carry no meal-time information, so they land in the fallback bucket.
const LEGACY_MEAL_TAGS: &[&str] = &[
    "fat_loss",
    "muscle_gain",
    "balanced",
    "south_indian",
    "north_indian",
    "east_indian",
    "west_indian",
    "street_food",
    "other",
];

impl MealCategory {
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    /// Bucket for entries whose tag is not a meal time.
    pub const FALLBACK: MealCategory = MealCategory::Snack;

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Lenient parse used for persisted and remote data: never fails.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            "snack" | "snacks" => Self::Snack,
            legacy => {
                if !LEGACY_MEAL_TAGS.contains(&legacy) {
                    tracing::debug!(tag = legacy, "unrecognized meal category, using fallback");
                }
                Self::FALLBACK
            }
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input.
impl FromStr for MealCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(Error::validation(
                "category",
                format!("'{s}' is not one of: breakfast, lunch, dinner, snack"),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for MealCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    #[default]
    CustomMeal,
    FoodRecommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub name: String,
    pub calories: u32,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub category: MealCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: MealSource,
}

/// User-supplied meal before validation. Calories arrive as a float so that
/// NaN and negative input can be rejected instead of silently coerced.
#[derive(Debug, Clone)]
pub struct NewMealEntry {
    pub name: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub category: MealCategory,
    pub source: MealSource,
}

impl NewMealEntry {
    #[must_use]
    pub fn custom(name: impl Into<String>, calories: f64, category: MealCategory) -> Self {
        Self {
            name: name.into(),
            calories,
            protein: None,
            carbs: None,
            fat: None,
            category,
            source: MealSource::CustomMeal,
        }
    }

    /// Validate and stamp the entry. Nothing is persisted here.
    pub fn into_entry(self, id: String, timestamp: DateTime<Utc>) -> Result<MealEntry> {
        let name = validate_meal_name(&self.name)?;
        let calories = validate_calories(self.calories)?;
        let protein = validate_macro("protein", self.protein)?;
        let carbs = validate_macro("carbs", self.carbs)?;
        let fat = validate_macro("fat", self.fat)?;
        Ok(MealEntry {
            id,
            name,
            calories,
            protein,
            carbs,
            fat,
            category: self.category,
            timestamp,
            source: self.source,
        })
    }
}

pub fn validate_meal_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "meal name must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[allow(clippy::cast_sign_loss)]
pub fn validate_calories(calories: f64) -> Result<u32> {
    if !calories.is_finite() {
        return Err(Error::validation("calories", "must be a number"));
    }
    if calories < 0.0 {
        return Err(Error::validation("calories", "must not be negative"));
    }
    let rounded = calories.round();
    if rounded > f64::from(u32::MAX) {
        return Err(Error::validation("calories", "value is too large"));
    }
    Ok(rounded as u32)
}

fn validate_macro(field: &str, grams: Option<f64>) -> Result<f64> {
    match grams {
        None => Ok(0.0),
        Some(g) if g.is_finite() && g >= 0.0 => Ok(g),
        Some(_) => Err(Error::validation(field, "must be a non-negative number")),
    }
}

pub fn validate_daily_goal(value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(Error::validation(
            "daily_goal",
            "calorie goal must be greater than 0",
        ));
    }
    u32::try_from(value).map_err(|_| Error::validation("daily_goal", "value is too large"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Social,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 5] = [
        GoalCategory::Health,
        GoalCategory::Productivity,
        GoalCategory::Learning,
        GoalCategory::Mindfulness,
        GoalCategory::Social,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Productivity => "productivity",
            Self::Learning => "learning",
            Self::Mindfulness => "mindfulness",
            Self::Social => "social",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Health)
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "health" => Ok(Self::Health),
            "productivity" => Ok(Self::Productivity),
            "learning" => Ok(Self::Learning),
            "mindfulness" => Ok(Self::Mindfulness),
            "social" => Ok(Self::Social),
            _ => Err(Error::validation(
                "category",
                format!("'{s}' is not one of: health, productivity, learning, mindfulness, social"),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for GoalCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthGoal {
    pub id: String,
    pub text: String,
    pub category: GoalCategory,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// --- Derived views ---

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: MealCategory,
    pub entries: Vec<MealEntry>,
    pub subtotal_calories: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub daily_goal: u32,
    pub consumed: u64,
    pub remaining: u64,
    pub progress_percentage: u8,
    pub over_goal: bool,
    pub meals: Vec<CategoryGroup>,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub calories: u64,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalSummary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    pub completion_rate: u8,
}
