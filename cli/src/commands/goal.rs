use anyhow::Result;

use sprout_core::store::SqliteStore;
use sprout_core::sync::SyncCoordinator;

use super::helpers::print_status;

pub(crate) async fn cmd_goal_set(
    sync: &SyncCoordinator<SqliteStore>,
    calories: i64,
    json: bool,
) -> Result<()> {
    let outcome = sync.set_goal(calories).await?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "daily_goal": outcome.value,
                "status": outcome.status,
                "notice": outcome.notice(),
            })
        );
    } else {
        println!("Daily goal: {} kcal", outcome.value);
        print_status(outcome.status);
    }
    Ok(())
}

pub(crate) fn cmd_goal_show(sync: &SyncCoordinator<SqliteStore>, json: bool) -> Result<()> {
    let summary = sync.entries().summary()?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "daily_goal": summary.daily_goal,
                "consumed": summary.consumed,
                "remaining": summary.remaining,
                "progress_percentage": summary.progress_percentage,
            })
        );
    } else {
        let goal = summary.daily_goal;
        let pct = summary.progress_percentage;
        println!("Daily goal: {goal} kcal ({pct}% reached today)");
    }
    Ok(())
}
