use anyhow::Result;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use sprout_core::goals::GoalTracker;
use sprout_core::store::SqliteStore;

use super::helpers::{json_error, parse_goal_category, truncate};

pub(crate) fn cmd_goals_add(
    goals: &GoalTracker<SqliteStore>,
    text: &str,
    category: &str,
    json: bool,
) -> Result<()> {
    let category = parse_goal_category(category)?;
    let id = goals.add(text, category)?;
    if json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("Added {category} goal {id}");
    }
    Ok(())
}

pub(crate) fn cmd_goals_toggle(
    goals: &GoalTracker<SqliteStore>,
    id: &str,
    json: bool,
) -> Result<()> {
    match goals.toggle(id) {
        Ok(goal) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&goal)?);
            } else if goal.completed {
                println!("Completed: {}", goal.text);
            } else {
                println!("Reopened: {}", goal.text);
            }
            Ok(())
        }
        Err(sprout_core::Error::NotFound(_)) => not_found(id, json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cmd_goals_remove(
    goals: &GoalTracker<SqliteStore>,
    id: &str,
    json: bool,
) -> Result<()> {
    match goals.remove(id) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "removed": id }));
            } else {
                println!("Removed goal {id}");
            }
            Ok(())
        }
        Err(sprout_core::Error::NotFound(_)) => not_found(id, json),
        Err(e) => Err(e.into()),
    }
}

fn not_found(id: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(&format!("Goal {id} not found")));
    } else {
        eprintln!("Goal {id} not found");
    }
    process::exit(2);
}

pub(crate) fn cmd_goals_list(goals: &GoalTracker<SqliteStore>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct GoalRow {
        #[tabled(rename = "")]
        done: &'static str,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Goal")]
        text: String,
        #[tabled(rename = "Category")]
        category: String,
    }

    let list = goals.list()?;
    let summary = goals.summary()?;

    if json {
        let value = serde_json::json!({ "goals": list, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if list.is_empty() {
        eprintln!("No goals yet. Add one with `sprout goals add \"<text>\"`.");
        return Ok(());
    }

    let rows: Vec<GoalRow> = list
        .iter()
        .map(|g| GoalRow {
            done: if g.completed { "[x]" } else { "[ ]" },
            id: g.id.clone(),
            text: truncate(&g.text, 40),
            category: g.category.to_string(),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!(
        "{} of {} done ({}%)",
        summary.completed, summary.total, summary.completion_rate
    );
    Ok(())
}
