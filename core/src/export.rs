use std::io::Write;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{MealCategory, MealEntry, MealSource};

#[derive(Serialize)]
struct HistoryRow<'a> {
    id: &'a str,
    timestamp: String,
    name: &'a str,
    category: MealCategory,
    calories: u32,
    protein: f64,
    carbs: f64,
    fat: f64,
    source: MealSource,
}

impl<'a> From<&'a MealEntry> for HistoryRow<'a> {
    fn from(entry: &'a MealEntry) -> Self {
        Self {
            id: &entry.id,
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            name: &entry.name,
            category: entry.category,
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            source: entry.source,
        }
    }
}

/// Write meal history as CSV, oldest entry first. The header row is always
/// written, even for an empty history.
pub fn write_history_csv<W: Write>(writer: W, entries: &[MealEntry]) -> Result<()> {
    let mut sorted: Vec<&MealEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record([
        "id",
        "timestamp",
        "name",
        "category",
        "calories",
        "protein",
        "carbs",
        "fat",
        "source",
    ])
    .map_err(csv_error)?;
    for entry in sorted {
        wtr.serialize(HistoryRow::from(entry)).map_err(csv_error)?;
    }
    wtr.flush().map_err(|e| Error::Storage(format!("csv export: {e}")))?;
    Ok(())
}

fn csv_error(err: csv::Error) -> Error {
    Error::Storage(format!("csv export: {err}"))
}
