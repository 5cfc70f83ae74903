use anyhow::Result;
use std::io;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use sprout_core::clock::local_date;
use sprout_core::export::write_history_csv;
use sprout_core::store::SqliteStore;
use sprout_core::sync::{SyncCoordinator, SyncStatus};

use super::helpers::{no_neg_zero, print_entries_table, progress_bar};

pub(crate) async fn cmd_today(sync: &SyncCoordinator<SqliteStore>, json: bool) -> Result<()> {
    let outcome = sync.refresh().await?;
    let summary = outcome.value;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date = summary.date;
    println!("=== {date} ===\n");

    let consumed = summary.consumed;
    let goal = summary.daily_goal;
    let pct = summary.progress_percentage;
    println!("  {} {pct}%", progress_bar(pct, 30));
    if summary.over_goal {
        let over = consumed - u64::from(goal);
        println!("  {consumed} / {goal} kcal, {over} over goal\n");
    } else {
        let remaining = summary.remaining;
        println!("  {consumed} / {goal} kcal, {remaining} remaining\n");
    }

    if summary.meals.is_empty() {
        println!("  No meals logged yet");
    } else {
        for group in &summary.meals {
            let label = group.category.as_str().to_uppercase();
            let sub = group.subtotal_calories;
            println!("  {label} ({sub} kcal)");
            print_entries_table(&group.entries);
            println!();
        }
        let p = no_neg_zero(summary.total_protein);
        let c = no_neg_zero(summary.total_carbs);
        let f = no_neg_zero(summary.total_fat);
        println!("  MACROS: P:{p:.0}g C:{c:.0}g F:{f:.0}g");
    }

    if outcome.status == SyncStatus::Offline {
        eprintln!("Service unreachable, showing local data");
    }
    Ok(())
}

pub(crate) fn cmd_history(
    sync: &SyncCoordinator<SqliteStore>,
    days: u32,
    csv: bool,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Meals")]
        entries: usize,
        #[tabled(rename = "Calories")]
        calories: u64,
    }

    let entries = sync.entries();

    if csv {
        let cutoff = entries.today() - chrono::Duration::days(i64::from(days.max(1)) - 1);
        let history: Vec<_> = entries
            .history()?
            .into_iter()
            .filter(|e| local_date(e.timestamp) >= cutoff)
            .collect();
        write_history_csv(io::stdout().lock(), &history)?;
        return Ok(());
    }

    let totals = entries.history_totals(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    if totals.iter().all(|t| t.entries == 0) {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = totals
        .iter()
        .rev()
        .map(|t| HistoryRow {
            date: t.date.to_string(),
            entries: t.entries,
            calories: t.calories,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
