use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use sprout_core::models::{GoalCategory, MealCategory, MealEntry};
use sprout_core::sync::SyncStatus;

pub(crate) fn parse_meal_category(s: &str) -> Result<MealCategory> {
    s.parse::<MealCategory>()
        .with_context(|| format!("Unknown meal '{s}'. Use breakfast, lunch, dinner, or snack"))
}

pub(crate) fn parse_goal_category(s: &str) -> Result<GoalCategory> {
    s.parse::<GoalCategory>().with_context(|| {
        format!("Unknown category '{s}'. Use health, productivity, learning, mindfulness, or social")
    })
}

/// `[#######-------]` style bar, already clamped by the caller's percentage.
pub(crate) fn progress_bar(percentage: u8, width: usize) -> String {
    let filled = usize::from(percentage.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Sync notice on stderr so `--json` output stays clean.
pub(crate) fn print_status(status: SyncStatus) {
    match status {
        SyncStatus::Offline => {
            eprintln!("{} (will sync when the service is back)", status.notice());
        }
        _ => eprintln!("{}", status.notice()),
    }
}

pub(crate) fn print_entries_table(entries: &[MealEntry]) {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "kcal")]
        calories: u32,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            time: e.timestamp.with_timezone(&Local).format("%H:%M").to_string(),
            name: truncate(&e.name, 30),
            meal: e.category.to_string(),
            calories: e.calories,
            protein: format!("{:.0}g", no_neg_zero(e.protein)),
            carbs: format!("{:.0}g", no_neg_zero(e.carbs)),
            fat: format!("{:.0}g", no_neg_zero(e.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
