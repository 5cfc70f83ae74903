use anyhow::{Result, bail};
use std::process;

use sprout_core::catalog::FoodCatalog;
use sprout_core::models::{MealEntry, MealSource, NewMealEntry};
use sprout_core::store::SqliteStore;
use sprout_core::sync::{SyncCoordinator, SyncOutcome, SyncStatus};

use super::helpers::{json_error, parse_meal_category, print_status};

#[allow(clippy::too_many_arguments)]
pub(crate) async fn cmd_log(
    sync: &SyncCoordinator<SqliteStore>,
    name: &str,
    calories: f64,
    meal: &str,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    json: bool,
) -> Result<()> {
    let category = parse_meal_category(meal)?;
    let outcome = sync
        .append(NewMealEntry {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            category,
            source: MealSource::CustomMeal,
        })
        .await?;
    report_logged(sync, &outcome, json)
}

pub(crate) async fn cmd_eat(
    sync: &SyncCoordinator<SqliteStore>,
    id: &str,
    meal: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = FoodCatalog::new();
    let Some(item) = catalog.get(id) else {
        if json {
            println!("{}", json_error(&format!("No catalog item '{id}'")));
        } else {
            eprintln!("No catalog item '{id}'. Browse with `sprout catalog <meal>`.");
        }
        process::exit(2);
    };
    let category = meal.map(parse_meal_category).transpose()?;
    let outcome = sync.append(item.to_new_entry(category)).await?;
    report_logged(sync, &outcome, json)
}

fn report_logged(
    sync: &SyncCoordinator<SqliteStore>,
    outcome: &SyncOutcome<MealEntry>,
    json: bool,
) -> Result<()> {
    let summary = sync.entries().summary()?;

    if json {
        let value = serde_json::json!({
            "status": outcome.status,
            "notice": outcome.notice(),
            "entry": outcome.value,
            "consumed": summary.consumed,
            "remaining": summary.remaining,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let entry = &outcome.value;
    println!(
        "Logged {} ({} kcal, {})",
        entry.name, entry.calories, entry.category
    );
    println!(
        "Today: {} / {} kcal, {} remaining",
        summary.consumed, summary.daily_goal, summary.remaining
    );
    print_status(outcome.status);
    Ok(())
}

pub(crate) async fn cmd_reset(
    sync: &SyncCoordinator<SqliteStore>,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !yes {
        bail!("This clears every meal logged today. Re-run with --yes to confirm");
    }
    let outcome = sync.reset_today().await?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "status": outcome.status, "notice": outcome.notice() })
        );
    } else {
        println!("Today's meals cleared");
        print_status(outcome.status);
    }
    Ok(())
}

/// Push queued offline entries, then pull the remote copy of today.
pub(crate) async fn cmd_sync(sync: &SyncCoordinator<SqliteStore>, json: bool) -> Result<()> {
    if sync.is_anonymous() {
        if json {
            println!("{}", json_error("No remote session configured"));
        } else {
            eprintln!("No remote session configured. Set SPROUT_REMOTE_URL and SPROUT_USER_ID.");
        }
        process::exit(2);
    }

    let report = sync.flush_pending().await?;
    let refreshed = sync.refresh().await?;

    if json {
        let value = serde_json::json!({
            "sent": report.sent,
            "remaining": report.remaining,
            "status": refreshed.status,
            "consumed": refreshed.value.consumed,
            "daily_goal": refreshed.value.daily_goal,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Pushed {} pending change{}, {} still queued",
        report.sent,
        if report.sent == 1 { "" } else { "s" },
        report.remaining
    );
    println!(
        "Today: {} / {} kcal",
        refreshed.value.consumed, refreshed.value.daily_goal
    );
    if refreshed.status == SyncStatus::Offline {
        eprintln!("Service unreachable, showing local data");
    }
    Ok(())
}
