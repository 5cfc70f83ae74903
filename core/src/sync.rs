//! Remote-first writes with a local fallback.
//!
//! Every mutation is attempted against the remote service first. Whatever the
//! remote says, the local store ends up reflecting the user's intent, and the
//! caller gets back which of the two paths was taken. Only validation errors
//! are returned as `Err`; remote failures become [`SyncStatus::Offline`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::local_date;
use crate::entries::EntryStore;
use crate::error::Result;
use crate::models::{DailySummary, MealEntry, NewMealEntry, validate_daily_goal};
use crate::remote::{AddMealRequest, AddMealResponse, CalorieRemote, RemoteError};
use crate::store::{KEY_DAILY_GOAL, KEY_PENDING_SYNC, KeyValueStore, read_json_or_default, to_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Remote confirmed, local cache updated.
    Synced,
    /// Remote failed, saved to local storage only.
    Offline,
    /// Anonymous session: no remote persistence is attempted.
    LocalOnly,
}

impl SyncStatus {
    #[must_use]
    pub fn notice(self) -> &'static str {
        match self {
            Self::Synced => "Saved",
            Self::Offline => "Saved offline",
            Self::LocalOnly => "Saved locally",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    PendingRemote,
    Confirmed,
    LocalFallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome<T> {
    pub status: SyncStatus,
    pub value: T,
}

impl<T> SyncOutcome<T> {
    fn new(status: SyncStatus, value: T) -> Self {
        Self { status, value }
    }

    #[must_use]
    pub fn notice(&self) -> &'static str {
        self.status.notice()
    }
}

/// A write the remote has not confirmed yet, replayed in queue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOp {
    AddMeal { entry: MealEntry },
    SetGoal { daily_goal: u32 },
    Reset { date: NaiveDate },
}

impl PendingOp {
    #[must_use]
    pub fn meal(&self) -> Option<&MealEntry> {
        match self {
            Self::AddMeal { entry } => Some(entry),
            _ => None,
        }
    }

    /// Superseded by a reset of `day`.
    fn cleared_by_reset(&self, day: NaiveDate) -> bool {
        match self {
            Self::AddMeal { entry } => local_date(entry.timestamp) == day,
            Self::Reset { date } => *date == day,
            Self::SetGoal { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub sent: usize,
    pub remaining: usize,
}

/// Where a mutation goes.
enum Route<'a> {
    Local,
    Remote(&'a dyn CalorieRemote),
    /// Earlier offline writes are still queued; this one waits behind them.
    Queue,
}

pub struct SyncCoordinator<S> {
    entries: EntryStore<S>,
    remote: Option<Arc<dyn CalorieRemote>>,
}

impl<S: KeyValueStore> SyncCoordinator<S> {
    pub fn new(entries: EntryStore<S>, remote: Option<Arc<dyn CalorieRemote>>) -> Self {
        Self { entries, remote }
    }

    pub fn local_only(entries: EntryStore<S>) -> Self {
        Self::new(entries, None)
    }

    pub fn entries(&self) -> &EntryStore<S> {
        &self.entries
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.remote.is_none()
    }

    /// Writes saved offline that the remote has not confirmed yet.
    pub fn pending(&self) -> Result<Vec<PendingOp>> {
        read_json_or_default(self.entries.store(), KEY_PENDING_SYNC)
    }

    fn pending_pair(pending: &[PendingOp]) -> Result<(&'static str, String)> {
        Ok((KEY_PENDING_SYNC, to_json(KEY_PENDING_SYNC, pending)?))
    }

    /// The remote only sees writes in the order the user made them, so a
    /// non-empty queue is flushed first and anything left over means this
    /// write is queued too.
    async fn route(&self, operation: &'static str) -> Result<Route<'_>> {
        let Some(remote) = &self.remote else {
            return Ok(Route::Local);
        };
        if !self.pending()?.is_empty() && self.flush_pending().await?.remaining > 0 {
            tracing::debug!(operation, "earlier offline writes still queued");
            return Ok(Route::Queue);
        }
        Ok(Route::Remote(remote.as_ref()))
    }

    pub async fn append(&self, meal: NewMealEntry) -> Result<SyncOutcome<MealEntry>> {
        let entry = self.entries.prepare(meal)?;

        match self.route("append").await? {
            Route::Local => {
                self.entries.commit(entry.clone())?;
                return Ok(SyncOutcome::new(SyncStatus::LocalOnly, entry));
            }
            Route::Queue => {}
            Route::Remote(remote) => {
                trace_phase("append", SyncPhase::PendingRemote);
                let sent = remote
                    .add_meal(&AddMealRequest::from(&entry))
                    .await
                    .and_then(ensure_success);
                match sent {
                    Ok(response) => {
                        self.entries.commit(entry.clone())?;
                        trace_phase("append", SyncPhase::Confirmed);
                        let local_total = self.entries.consumed_today()?;
                        if response.calorie_entry.total_calories != local_total {
                            tracing::debug!(
                                remote = response.calorie_entry.total_calories,
                                local = local_total,
                                "remote total differs from local cache"
                            );
                        }
                        return Ok(SyncOutcome::new(SyncStatus::Synced, entry));
                    }
                    Err(err) => fallback("append", &err),
                }
            }
        }

        let mut pending = self.pending()?;
        pending.push(PendingOp::AddMeal {
            entry: entry.clone(),
        });
        self.entries
            .commit_with(entry.clone(), vec![Self::pending_pair(&pending)?])?;
        Ok(SyncOutcome::new(SyncStatus::Offline, entry))
    }

    /// Reset today locally whatever the remote says. An unconfirmed reset is
    /// queued, and queued meals for today are dropped with it.
    pub async fn reset_today(&self) -> Result<SyncOutcome<()>> {
        let (status, queue) = match self.route("reset").await? {
            Route::Local => (SyncStatus::LocalOnly, false),
            Route::Queue => (SyncStatus::Offline, true),
            Route::Remote(remote) => {
                trace_phase("reset", SyncPhase::PendingRemote);
                match remote.reset().await {
                    Ok(()) => {
                        trace_phase("reset", SyncPhase::Confirmed);
                        (SyncStatus::Synced, false)
                    }
                    Err(err) => {
                        fallback("reset", &err);
                        (SyncStatus::Offline, true)
                    }
                }
            }
        };

        let today = self.entries.today();
        let mut pending = self.pending()?;
        pending.retain(|op| !op.cleared_by_reset(today));
        if queue {
            pending.push(PendingOp::Reset { date: today });
        }
        self.entries.reset_today_with(vec![Self::pending_pair(&pending)?])?;
        Ok(SyncOutcome::new(status, ()))
    }

    pub async fn set_goal(&self, value: i64) -> Result<SyncOutcome<u32>> {
        let goal = validate_daily_goal(value)?;

        let (status, queue) = match self.route("set_goal").await? {
            Route::Local => (SyncStatus::LocalOnly, false),
            Route::Queue => (SyncStatus::Offline, true),
            Route::Remote(remote) => {
                trace_phase("set_goal", SyncPhase::PendingRemote);
                match remote.set_goal(goal).await {
                    Ok(()) => {
                        trace_phase("set_goal", SyncPhase::Confirmed);
                        (SyncStatus::Synced, false)
                    }
                    Err(err) => {
                        fallback("set_goal", &err);
                        (SyncStatus::Offline, true)
                    }
                }
            }
        };

        if queue {
            // Only the latest goal matters
            let mut pending = self.pending()?;
            pending.retain(|op| !matches!(op, PendingOp::SetGoal { .. }));
            pending.push(PendingOp::SetGoal { daily_goal: goal });
            self.entries.store().set_many(&[
                (KEY_DAILY_GOAL, goal.to_string()),
                Self::pending_pair(&pending)?,
            ])?;
        } else {
            self.entries.set_goal(i64::from(goal))?;
        }
        Ok(SyncOutcome::new(status, goal))
    }

    /// Pull today's state from the remote into the local cache. Queued writes
    /// win over the remote copy: pending meals are kept on top of it, a queued
    /// reset discards the remote meals, and a queued goal keeps the local
    /// goal. On failure the last local snapshot is returned.
    pub async fn refresh(&self) -> Result<SyncOutcome<DailySummary>> {
        let Some(remote) = &self.remote else {
            return Ok(SyncOutcome::new(SyncStatus::LocalOnly, self.entries.summary()?));
        };

        match remote.today().await {
            Ok(today) => {
                let pending = self.pending()?;
                let local_day = self.entries.today();
                let reset_queued = pending
                    .iter()
                    .any(|op| matches!(op, PendingOp::Reset { date } if *date == local_day));
                let goal_queued = pending
                    .iter()
                    .any(|op| matches!(op, PendingOp::SetGoal { .. }));

                let now = self.entries.clock().now();
                let mut merged: Vec<MealEntry> = if reset_queued {
                    Vec::new()
                } else {
                    today.meals.into_iter().map(|m| m.into_entry(now)).collect()
                };
                for entry in pending.iter().filter_map(PendingOp::meal) {
                    if local_date(entry.timestamp) == local_day
                        && !merged.iter().any(|m| m.id == entry.id)
                    {
                        merged.push(entry.clone());
                    }
                }
                self.entries.replace_today(merged)?;
                if !goal_queued && today.daily_goal > 0 {
                    self.entries.set_goal(i64::from(today.daily_goal))?;
                }
                tracing::info!(reset_queued, goal_queued, "local cache refreshed from remote");
                Ok(SyncOutcome::new(SyncStatus::Synced, self.entries.summary()?))
            }
            Err(err) => {
                fallback("refresh", &err);
                Ok(SyncOutcome::new(SyncStatus::Offline, self.entries.summary()?))
            }
        }
    }

    /// Replay queued writes in order, stopping at the first failure. Meals
    /// carry their entry id so a replay is harmless. A reset queued on an
    /// earlier day is dropped: the remote's today is a different day now.
    pub async fn flush_pending(&self) -> Result<FlushReport> {
        let mut pending = self.pending()?;
        let Some(remote) = &self.remote else {
            return Ok(FlushReport {
                sent: 0,
                remaining: pending.len(),
            });
        };

        let today = self.entries.today();
        let mut sent = 0;
        while let Some(op) = pending.first() {
            let result = match op {
                PendingOp::AddMeal { entry } => remote
                    .add_meal(&AddMealRequest::from(entry))
                    .await
                    .and_then(ensure_success)
                    .map(|_| true),
                PendingOp::SetGoal { daily_goal } => {
                    remote.set_goal(*daily_goal).await.map(|()| true)
                }
                PendingOp::Reset { date } if *date == today => remote.reset().await.map(|()| true),
                PendingOp::Reset { date } => {
                    tracing::debug!(%date, "dropping reset queued on an earlier day");
                    Ok(false)
                }
            };
            match result {
                Ok(delivered) => {
                    pending.remove(0);
                    sent += usize::from(delivered);
                    self.entries
                        .store()
                        .set(KEY_PENDING_SYNC, &to_json(KEY_PENDING_SYNC, &pending)?)?;
                }
                Err(err) => {
                    fallback("flush", &err);
                    break;
                }
            }
        }

        if sent > 0 {
            tracing::info!(sent, remaining = pending.len(), "pending writes pushed");
        }
        Ok(FlushReport {
            sent,
            remaining: pending.len(),
        })
    }
}

fn ensure_success(response: AddMealResponse) -> std::result::Result<AddMealResponse, RemoteError> {
    if response.success {
        Ok(response)
    } else {
        Err(RemoteError::Server {
            status: 200,
            message: "add-meal reported success = false".to_string(),
        })
    }
}

fn trace_phase(operation: &'static str, phase: SyncPhase) {
    tracing::debug!(operation, ?phase, "sync phase");
}

fn fallback(operation: &'static str, err: &RemoteError) {
    tracing::warn!(
        operation,
        error = %err,
        phase = ?SyncPhase::LocalFallback,
        "remote write failed, keeping local copy"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;
    use crate::models::MealCategory;
    use crate::remote::{CalorieEntry, RemoteMeal, TodayResponse};
    use crate::store::MemoryStore;

    /// In-memory remote that can be switched offline.
    #[derive(Default)]
    struct FakeRemote {
        offline: Mutex<bool>,
        meals: Mutex<Vec<RemoteMeal>>,
        goal: Mutex<u32>,
        add_calls: Mutex<usize>,
    }

    impl FakeRemote {
        fn set_offline(&self, offline: bool) {
            *self.offline.lock().unwrap() = offline;
        }

        fn check(&self) -> std::result::Result<(), RemoteError> {
            if *self.offline.lock().unwrap() {
                Err(RemoteError::Unavailable("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn total(&self) -> u64 {
            self.meals.lock().unwrap().iter().map(|m| u64::from(m.calories)).sum()
        }
    }

    #[async_trait]
    impl CalorieRemote for FakeRemote {
        async fn today(&self) -> std::result::Result<TodayResponse, RemoteError> {
            self.check()?;
            Ok(TodayResponse {
                total_calories: self.total(),
                daily_goal: *self.goal.lock().unwrap(),
                meals: self.meals.lock().unwrap().clone(),
            })
        }

        async fn add_meal(
            &self,
            request: &AddMealRequest,
        ) -> std::result::Result<AddMealResponse, RemoteError> {
            *self.add_calls.lock().unwrap() += 1;
            self.check()?;
            {
                let mut meals = self.meals.lock().unwrap();
                if !meals.iter().any(|m| m.id == request.client_id) {
                    meals.push(RemoteMeal {
                        id: request.client_id.clone(),
                        name: request.name.clone(),
                        calories: request.calories,
                        category: request.category,
                        protein: request.protein,
                        carbs: request.carbs,
                        fat: request.fat,
                        timestamp: request.timestamp,
                        source: request.source,
                    });
                }
            }
            Ok(AddMealResponse {
                success: true,
                calorie_entry: CalorieEntry {
                    total_calories: self.total(),
                    meals: self.meals.lock().unwrap().clone(),
                },
            })
        }

        async fn set_goal(&self, daily_goal: u32) -> std::result::Result<(), RemoteError> {
            self.check()?;
            *self.goal.lock().unwrap() = daily_goal;
            Ok(())
        }

        async fn reset(&self) -> std::result::Result<(), RemoteError> {
            self.check()?;
            self.meals.lock().unwrap().clear();
            Ok(())
        }
    }

    fn entries() -> EntryStore<MemoryStore> {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        EntryStore::with_clock(MemoryStore::new(), Arc::new(FixedClock::local_noon(day)))
    }

    fn coordinator(remote: &Arc<FakeRemote>) -> SyncCoordinator<MemoryStore> {
        let remote: Arc<dyn CalorieRemote> = remote.clone();
        SyncCoordinator::new(entries(), Some(remote))
    }

    fn meal(calories: f64) -> NewMealEntry {
        NewMealEntry::custom("Meal", calories, MealCategory::Dinner)
    }

    #[tokio::test]
    async fn append_online_is_synced() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);

        let outcome = sync.append(meal(400.0)).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.notice(), "Saved");
        assert_eq!(sync.entries().consumed_today().unwrap(), 400);
        assert_eq!(remote.total(), 400);
        assert!(sync.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_offline_falls_back_to_local() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_offline(true);
        let sync = coordinator(&remote);

        let outcome = sync.append(meal(350.0)).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(outcome.notice(), "Saved offline");

        let today = sync.entries().list_today().unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, outcome.value.id);
        assert_eq!(sync.entries().consumed_today().unwrap(), 350);
        assert_eq!(sync.pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_validation_error_is_fatal_and_skips_remote() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);

        let err = sync.append(meal(f64::NAN)).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(*remote.add_calls.lock().unwrap(), 0);
        assert!(sync.entries().list_today().unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_session_is_local_only() {
        let sync = SyncCoordinator::local_only(entries());
        assert!(sync.is_anonymous());

        let outcome = sync.append(meal(200.0)).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::LocalOnly);
        assert_eq!(sync.entries().consumed_today().unwrap(), 200);
        assert!(sync.pending().unwrap().is_empty());

        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { sent: 0, remaining: 0 });
    }

    #[tokio::test]
    async fn flush_pending_replays_once_online() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_offline(true);
        let sync = coordinator(&remote);
        sync.append(meal(100.0)).await.unwrap();
        sync.append(meal(200.0)).await.unwrap();

        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { sent: 0, remaining: 2 });

        remote.set_offline(false);
        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { sent: 2, remaining: 0 });
        assert_eq!(remote.total(), 300);

        // Replaying again does not duplicate on the remote
        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(remote.meals.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refresh_merges_remote_with_pending() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.append(meal(500.0)).await.unwrap();

        remote.set_offline(true);
        sync.append(meal(120.0)).await.unwrap();
        remote.set_offline(false);
        remote.set_goal(1600).await.unwrap();

        let outcome = sync.refresh().await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.value.consumed, 620);
        assert_eq!(outcome.value.daily_goal, 1600);
        assert_eq!(sync.entries().list_today().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refresh_offline_returns_local_snapshot() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.append(meal(300.0)).await.unwrap();

        remote.set_offline(true);
        let outcome = sync.refresh().await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(outcome.value.consumed, 300);
    }

    #[tokio::test]
    async fn reset_offline_still_clears_local_and_pending() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_offline(true);
        let sync = coordinator(&remote);
        sync.set_goal(1700).await.unwrap();
        for _ in 0..5 {
            sync.append(meal(100.0)).await.unwrap();
        }

        let outcome = sync.reset_today().await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Offline);
        assert!(sync.entries().list_today().unwrap().is_empty());
        assert_eq!(sync.entries().consumed_today().unwrap(), 0);
        assert_eq!(sync.entries().daily_goal().unwrap(), 1700);
        assert_eq!(
            sync.pending().unwrap(),
            vec![
                PendingOp::SetGoal { daily_goal: 1700 },
                PendingOp::Reset {
                    date: sync.entries().today()
                },
            ]
        );
        // Appends waited behind the unsent goal and never hit the remote
        assert_eq!(*remote.add_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn offline_goal_survives_refresh() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.set_goal(1900).await.unwrap();

        remote.set_offline(true);
        sync.set_goal(1500).await.unwrap();
        remote.set_offline(false);

        let outcome = sync.refresh().await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.value.daily_goal, 1500);

        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { sent: 1, remaining: 0 });
        assert_eq!(*remote.goal.lock().unwrap(), 1500);
        assert_eq!(sync.refresh().await.unwrap().value.daily_goal, 1500);
    }

    #[tokio::test]
    async fn offline_reset_survives_refresh() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.append(meal(400.0)).await.unwrap();
        sync.append(meal(300.0)).await.unwrap();

        remote.set_offline(true);
        assert_eq!(sync.reset_today().await.unwrap().status, SyncStatus::Offline);
        remote.set_offline(false);

        let outcome = sync.refresh().await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.value.consumed, 0);
        assert!(sync.entries().list_today().unwrap().is_empty());
        assert_eq!(remote.total(), 700);

        sync.flush_pending().await.unwrap();
        assert_eq!(remote.total(), 0);
        assert_eq!(sync.refresh().await.unwrap().value.consumed, 0);
    }

    #[tokio::test]
    async fn meals_after_offline_reset_are_kept_on_refresh() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.append(meal(400.0)).await.unwrap();

        remote.set_offline(true);
        sync.reset_today().await.unwrap();
        sync.append(meal(150.0)).await.unwrap();
        remote.set_offline(false);

        let outcome = sync.refresh().await.unwrap();
        assert_eq!(outcome.value.consumed, 150);
        assert_eq!(sync.pending().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn queued_writes_reach_remote_before_new_ones() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);
        sync.append(meal(400.0)).await.unwrap();

        remote.set_offline(true);
        sync.reset_today().await.unwrap();
        remote.set_offline(false);

        // The queued reset is replayed first, so the new meal survives it
        let outcome = sync.append(meal(250.0)).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(remote.total(), 250);
        assert_eq!(sync.entries().consumed_today().unwrap(), 250);
        assert!(sync.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_queue_behind_unflushed_ones() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_offline(true);
        let sync = coordinator(&remote);
        sync.append(meal(100.0)).await.unwrap();

        let outcome = sync.set_goal(1800).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(sync.entries().daily_goal().unwrap(), 1800);
        assert_eq!(sync.pending().unwrap().len(), 2);

        remote.set_offline(false);
        let report = sync.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { sent: 2, remaining: 0 });
        assert_eq!(*remote.goal.lock().unwrap(), 1800);
        assert_eq!(remote.total(), 100);
    }

    #[tokio::test]
    async fn set_goal_validation_and_fallback() {
        let remote = Arc::new(FakeRemote::default());
        let sync = coordinator(&remote);

        assert!(sync.set_goal(-5).await.unwrap_err().is_validation());
        assert_eq!(sync.entries().daily_goal().unwrap(), 2000);

        let outcome = sync.set_goal(1900).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(*remote.goal.lock().unwrap(), 1900);

        remote.set_offline(true);
        let outcome = sync.set_goal(1750).await.unwrap();
        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(sync.entries().daily_goal().unwrap(), 1750);
    }
}
