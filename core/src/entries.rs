//! Today's meal log and the daily calorie goal, persisted through a
//! [`KeyValueStore`].

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::aggregate::{consumed_total, daily_summary, day_totals};
use crate::clock::{Clock, SystemClock, local_date};
use crate::error::Result;
use crate::models::{
    DEFAULT_DAILY_GOAL, DailySummary, DayTotal, MealEntry, NewMealEntry, validate_daily_goal,
};
use crate::store::{
    KEY_CONSUMED_TODAY, KEY_DAILY_GOAL, KEY_HISTORY_LOG, KEY_TODAY_DATE, KEY_TODAY_LOG,
    KeyValueStore, read_json_or_default, to_json,
};

pub const HISTORY_RETENTION_DAYS: i64 = 90;

pub struct EntryStore<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> EntryStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The persisted today-log, or empty when it belongs to an earlier day.
    /// Stale entries already live in the history log.
    fn today_log(&self) -> Result<Vec<MealEntry>> {
        let today = self.today();
        let stored_date = self
            .store
            .get(KEY_TODAY_DATE)?
            .and_then(|d| d.parse::<NaiveDate>().ok());
        if stored_date != Some(today) {
            return Ok(Vec::new());
        }
        read_json_or_default(&self.store, KEY_TODAY_LOG)
    }

    pub fn history(&self) -> Result<Vec<MealEntry>> {
        read_json_or_default(&self.store, KEY_HISTORY_LOG)
    }

    /// Validate and stamp an entry without persisting it. Timestamps never go
    /// backwards relative to entries already logged today.
    pub fn prepare(&self, meal: NewMealEntry) -> Result<MealEntry> {
        let latest = self.today_log()?.iter().map(|e| e.timestamp).max();
        let now = self.clock.now();
        let timestamp = latest.map_or(now, |l| l.max(now));
        meal.into_entry(Uuid::new_v4().to_string(), timestamp)
    }

    pub fn append(&self, meal: NewMealEntry) -> Result<String> {
        let entry = self.prepare(meal)?;
        let id = entry.id.clone();
        self.commit(entry)?;
        Ok(id)
    }

    /// Persist an already-validated entry under the day of its own
    /// timestamp: an entry from an earlier day only lands in history.
    /// Committing the same id twice is a no-op.
    pub fn commit(&self, entry: MealEntry) -> Result<()> {
        self.commit_with(entry, Vec::new())
    }

    /// Commit plus extra keys written in the same unit.
    pub(crate) fn commit_with(&self, entry: MealEntry, extra: Vec<(&str, String)>) -> Result<()> {
        let today = self.today();
        let mut log = self.today_log()?;
        let mut history = self.history()?;
        if history.iter().chain(&log).any(|e| e.id == entry.id) {
            return Ok(());
        }

        let day = local_date(entry.timestamp);
        if day == today {
            log.push(entry.clone());
        }
        history.push(entry);
        let cutoff = today - Duration::days(HISTORY_RETENTION_DAYS);
        history.retain(|e| local_date(e.timestamp) >= cutoff);

        self.write_day(today, &log, &history, extra)?;
        tracing::debug!(%day, entries = log.len(), "meal entry committed");
        Ok(())
    }

    /// Whether an entry with this id has been committed and not yet pruned.
    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.history()?.iter().any(|e| e.id == id))
    }

    /// Most recent first.
    pub fn list_today(&self) -> Result<Vec<MealEntry>> {
        let mut log = self.today_log()?;
        log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(log)
    }

    pub fn consumed_today(&self) -> Result<u64> {
        Ok(consumed_total(&self.today_log()?))
    }

    /// Clear today's entries in one write. The goal is untouched.
    pub fn reset_today(&self) -> Result<()> {
        self.reset_today_with(Vec::new())
    }

    pub(crate) fn reset_today_with(&self, extra: Vec<(&str, String)>) -> Result<()> {
        let today = self.today();
        let mut history = self.history()?;
        history.retain(|e| local_date(e.timestamp) != today);
        self.write_day(today, &[], &history, extra)?;
        tracing::debug!(%today, "today's meal log reset");
        Ok(())
    }

    /// Replace today's entries wholesale, e.g. with the remote copy.
    pub fn replace_today(&self, entries: Vec<MealEntry>) -> Result<()> {
        let today = self.today();
        let mut history = self.history()?;
        history.retain(|e| {
            local_date(e.timestamp) != today && !entries.iter().any(|n| n.id == e.id)
        });
        history.extend(entries.iter().cloned());
        self.write_day(today, &entries, &history, Vec::new())
    }

    fn write_day(
        &self,
        today: NaiveDate,
        log: &[MealEntry],
        history: &[MealEntry],
        extra: Vec<(&str, String)>,
    ) -> Result<()> {
        let mut pairs: Vec<(&str, String)> = vec![
            (KEY_TODAY_LOG, to_json(KEY_TODAY_LOG, log)?),
            (KEY_HISTORY_LOG, to_json(KEY_HISTORY_LOG, history)?),
            (KEY_CONSUMED_TODAY, consumed_total(log).to_string()),
            (KEY_TODAY_DATE, today.to_string()),
        ];
        pairs.extend(extra);
        self.store.set_many(&pairs)
    }

    pub fn daily_goal(&self) -> Result<u32> {
        match self.store.get(KEY_DAILY_GOAL)? {
            None => Ok(DEFAULT_DAILY_GOAL),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(goal) if goal > 0 => Ok(goal),
                _ => {
                    tracing::warn!(value = %raw, "malformed daily goal, resetting to default");
                    self.store.remove(KEY_DAILY_GOAL)?;
                    Ok(DEFAULT_DAILY_GOAL)
                }
            },
        }
    }

    pub fn set_goal(&self, value: i64) -> Result<u32> {
        let goal = validate_daily_goal(value)?;
        self.store.set(KEY_DAILY_GOAL, &goal.to_string())?;
        Ok(goal)
    }

    pub fn summary(&self) -> Result<DailySummary> {
        let entries = self.today_log()?;
        Ok(daily_summary(self.today(), self.daily_goal()?, &entries))
    }

    pub fn history_totals(&self, days: u32) -> Result<Vec<DayTotal>> {
        Ok(day_totals(&self.history()?, self.today(), days))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{MealCategory, MealSource};
    use crate::store::{MemoryStore, SqliteStore};

    /// Clock that can be moved forward between calls.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(date: NaiveDate) -> Arc<Self> {
            Arc::new(Self(Mutex::new(FixedClock::local_noon(date).0)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn store_on(date: NaiveDate) -> EntryStore<MemoryStore> {
        EntryStore::with_clock(MemoryStore::new(), Arc::new(FixedClock::local_noon(date)))
    }

    fn meal(name: &str, calories: f64) -> NewMealEntry {
        NewMealEntry::custom(name, calories, MealCategory::Lunch)
    }

    #[test]
    fn test_append_visible_immediately() {
        let store = store_on(day());
        let id = store.append(meal("Rice", 300.0)).unwrap();

        let today = store.list_today().unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, id);
        assert_eq!(store.consumed_today().unwrap(), 300);
        assert_eq!(
            store.store().get(KEY_CONSUMED_TODAY).unwrap().as_deref(),
            Some("300")
        );
    }

    #[test]
    fn test_append_scenario_within_goal() {
        let store = store_on(day());
        store.set_goal(2000).unwrap();
        for c in [300.0, 450.0, 250.0] {
            store.append(meal("m", c)).unwrap();
        }
        let summary = store.summary().unwrap();
        assert_eq!(summary.consumed, 1000);
        assert_eq!(summary.remaining, 1000);
        assert_eq!(summary.progress_percentage, 50);
        assert!(!summary.over_goal);
    }

    #[test]
    fn test_append_rejects_invalid_without_state_change() {
        let store = store_on(day());
        store.append(meal("Rice", 300.0)).unwrap();

        assert!(store.append(meal("  ", 100.0)).unwrap_err().is_validation());
        assert!(store.append(meal("Soup", f64::NAN)).unwrap_err().is_validation());
        assert!(store.append(meal("Soup", -10.0)).unwrap_err().is_validation());

        assert_eq!(store.list_today().unwrap().len(), 1);
        assert_eq!(store.consumed_today().unwrap(), 300);
    }

    #[test]
    fn test_list_today_most_recent_first() {
        let clock = ManualClock::at(day());
        let store = EntryStore::with_clock(MemoryStore::new(), clock.clone());
        store.append(meal("first", 100.0)).unwrap();
        clock.advance(Duration::minutes(30));
        store.append(meal("second", 200.0)).unwrap();

        let names: Vec<String> = store.list_today().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let clock = ManualClock::at(day());
        let store = EntryStore::with_clock(MemoryStore::new(), clock.clone());
        store.append(meal("first", 100.0)).unwrap();
        clock.advance(Duration::minutes(-5));
        store.append(meal("second", 100.0)).unwrap();

        let log = store.list_today().unwrap();
        assert!(log[0].timestamp >= log[1].timestamp);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let store = store_on(day());
        let entry = store.prepare(meal("Rice", 300.0)).unwrap();
        store.commit(entry.clone()).unwrap();
        store.commit(entry).unwrap();
        assert_eq!(store.list_today().unwrap().len(), 1);
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_commit_files_earlier_day_under_history_only() {
        let store = store_on(day());
        let mut late = store.prepare(meal("Late dinner", 600.0)).unwrap();
        late.timestamp -= Duration::days(1);
        store.commit(late.clone()).unwrap();

        assert!(store.list_today().unwrap().is_empty());
        assert_eq!(store.consumed_today().unwrap(), 0);
        assert!(store.contains(&late.id).unwrap());
        let totals = store.history_totals(2).unwrap();
        assert_eq!(totals[0].calories, 600);
        assert_eq!(totals[1].calories, 0);

        // A replay of the same id stays a no-op
        store.commit(late).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_reset_clears_entries_keeps_goal() {
        let store = store_on(day());
        store.set_goal(1800).unwrap();
        for i in 0..5 {
            store.append(meal(&format!("m{i}"), 100.0)).unwrap();
        }
        store.reset_today().unwrap();

        assert!(store.list_today().unwrap().is_empty());
        assert_eq!(store.consumed_today().unwrap(), 0);
        assert_eq!(store.daily_goal().unwrap(), 1800);
        assert_eq!(
            store.store().get(KEY_CONSUMED_TODAY).unwrap().as_deref(),
            Some("0")
        );
    }

    #[test]
    fn test_set_goal_validation() {
        let store = store_on(day());
        assert_eq!(store.daily_goal().unwrap(), DEFAULT_DAILY_GOAL);
        assert!(store.set_goal(-5).unwrap_err().is_validation());
        assert!(store.set_goal(0).is_err());
        assert_eq!(store.daily_goal().unwrap(), DEFAULT_DAILY_GOAL);

        assert_eq!(store.set_goal(1500).unwrap(), 1500);
        assert_eq!(store.daily_goal().unwrap(), 1500);
    }

    #[test]
    fn test_malformed_goal_resets_to_default() {
        let store = store_on(day());
        store.store().set(KEY_DAILY_GOAL, "lots").unwrap();
        assert_eq!(store.daily_goal().unwrap(), DEFAULT_DAILY_GOAL);
    }

    #[test]
    fn test_malformed_log_resets_to_empty() {
        let store = store_on(day());
        store.append(meal("Rice", 300.0)).unwrap();
        store.store().set(KEY_TODAY_LOG, "[{\"broken\":").unwrap();
        assert!(store.list_today().unwrap().is_empty());

        store.append(meal("Soup", 120.0)).unwrap();
        assert_eq!(store.consumed_today().unwrap(), 120);
    }

    #[test]
    fn test_day_rollover_moves_log_to_history() {
        let clock = ManualClock::at(day());
        let store = EntryStore::with_clock(MemoryStore::new(), clock.clone());
        store.append(meal("yesterday", 700.0)).unwrap();

        clock.advance(Duration::days(1));
        assert!(store.list_today().unwrap().is_empty());
        assert_eq!(store.consumed_today().unwrap(), 0);

        store.append(meal("today", 200.0)).unwrap();
        assert_eq!(store.list_today().unwrap().len(), 1);
        let totals = store.history_totals(2).unwrap();
        assert_eq!(totals[0].calories, 700);
        assert_eq!(totals[1].calories, 200);
    }

    #[test]
    fn test_history_retention_prunes_old_entries() {
        let clock = ManualClock::at(day());
        let store = EntryStore::with_clock(MemoryStore::new(), clock.clone());
        store.append(meal("old", 100.0)).unwrap();

        clock.advance(Duration::days(HISTORY_RETENTION_DAYS + 1));
        store.append(meal("new", 100.0)).unwrap();

        let history = store.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "new");
    }

    #[test]
    fn test_replace_today_reconciles_history() {
        let store = store_on(day());
        store.append(meal("local", 100.0)).unwrap();

        let remote = store.prepare(meal("remote", 400.0)).unwrap();
        store.replace_today(vec![remote]).unwrap();

        let today = store.list_today().unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].name, "remote");
        assert_eq!(store.history().unwrap().len(), 1);
        assert_eq!(store.consumed_today().unwrap(), 400);
    }

    #[test]
    fn test_persisted_log_round_trips_on_sqlite() {
        let store = EntryStore::with_clock(
            SqliteStore::open_in_memory().unwrap(),
            Arc::new(FixedClock::local_noon(day())),
        );
        let mut recommended = meal("Quinoa Salad", 400.0);
        recommended.protein = Some(18.0);
        recommended.source = MealSource::FoodRecommendation;
        store.append(recommended).unwrap();
        store.append(meal("Tea", 30.0)).unwrap();

        let before = store.list_today().unwrap();
        let raw = store.store().get(KEY_TODAY_LOG).unwrap().unwrap();
        let mut decoded: Vec<MealEntry> = serde_json::from_str(&raw).unwrap();
        decoded.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        assert_eq!(decoded, before);
    }
}
