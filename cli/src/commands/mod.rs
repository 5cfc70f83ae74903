mod assistant;
mod catalog;
mod goal;
mod growth;
mod helpers;
mod meal;
mod summary;

use std::sync::Arc;

use anyhow::{Context, Result};

use sprout_core::entries::EntryStore;
use sprout_core::remote::CalorieRemote;
use sprout_core::store::SqliteStore;
use sprout_core::sync::SyncCoordinator;

use crate::config::Config;
use crate::remote::HttpCalorieService;

pub(crate) use assistant::cmd_ask;
pub(crate) use catalog::cmd_catalog;
pub(crate) use goal::{cmd_goal_set, cmd_goal_show};
pub(crate) use growth::{cmd_goals_add, cmd_goals_list, cmd_goals_remove, cmd_goals_toggle};
pub(crate) use meal::{cmd_eat, cmd_log, cmd_reset, cmd_sync};
pub(crate) use summary::{cmd_history, cmd_today};

pub(crate) fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))
}

/// Remote-first coordinator when both a service URL and a user are known,
/// otherwise an anonymous local-only session.
pub(crate) fn open_coordinator(config: &Config) -> Result<SyncCoordinator<SqliteStore>> {
    let entries = EntryStore::new(open_store(config)?);
    let remote: Option<Arc<dyn CalorieRemote>> = match (&config.remote_url, &config.user_id) {
        (Some(url), Some(user)) => Some(Arc::new(HttpCalorieService::new(url, user)?)),
        (Some(_), None) => {
            tracing::info!("no user id set, running as an anonymous local session");
            None
        }
        _ => None,
    };
    Ok(SyncCoordinator::new(entries, remote))
}
