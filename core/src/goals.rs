//! Personal growth goals. Local storage only, no remote sync.

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::goal_summary;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::models::{GoalCategory, GoalSummary, GrowthGoal};
use crate::store::{KEY_GROWTH_GOALS, KeyValueStore, read_json_or_default, to_json};

pub struct GoalTracker<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> GoalTracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Insertion order.
    pub fn list(&self) -> Result<Vec<GrowthGoal>> {
        read_json_or_default(&self.store, KEY_GROWTH_GOALS)
    }

    fn save(&self, goals: &[GrowthGoal]) -> Result<()> {
        self.store
            .set(KEY_GROWTH_GOALS, &to_json(KEY_GROWTH_GOALS, goals)?)
    }

    pub fn add(&self, text: &str, category: GoalCategory) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("text", "goal text must not be empty"));
        }
        let mut goals = self.list()?;
        let goal = GrowthGoal {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            category,
            completed: false,
            created_at: self.clock.now(),
            completed_at: None,
        };
        let id = goal.id.clone();
        goals.push(goal);
        self.save(&goals)?;
        tracing::debug!(%id, %category, "growth goal added");
        Ok(id)
    }

    /// Flip completion. `completed_at` is set on the false→true transition and
    /// cleared on the way back.
    pub fn toggle(&self, id: &str) -> Result<GrowthGoal> {
        let mut goals = self.list()?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("goal {id}")))?;
        goal.completed = !goal.completed;
        goal.completed_at = goal.completed.then(|| self.clock.now());
        let updated = goal.clone();
        self.save(&goals)?;
        Ok(updated)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut goals = self.list()?;
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Err(Error::NotFound(format!("goal {id}")));
        }
        self.save(&goals)
    }

    pub fn summary(&self) -> Result<GoalSummary> {
        Ok(goal_summary(&self.list()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker() -> GoalTracker<MemoryStore> {
        GoalTracker::new(MemoryStore::new())
    }

    #[test]
    fn test_add_and_list() {
        let goals = tracker();
        let a = goals.add("Read 20 pages", GoalCategory::Learning).unwrap();
        let b = goals.add("  Meditate  ", GoalCategory::Mindfulness).unwrap();
        assert_ne!(a, b);

        let list = goals.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, a);
        assert_eq!(list[1].text, "Meditate");
        assert!(!list[1].completed);
        assert!(list[1].completed_at.is_none());
    }

    #[test]
    fn test_add_empty_text_fails() {
        let goals = tracker();
        assert!(goals.add("   ", GoalCategory::Health).unwrap_err().is_validation());
        assert!(goals.list().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let goals = tracker();
        let id = goals.add("Walk 8k steps", GoalCategory::Health).unwrap();

        let done = goals.toggle(&id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = goals.toggle(&id).unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());

        let stored = &goals.list().unwrap()[0];
        assert!(!stored.completed);
        assert!(stored.completed_at.is_none());
    }

    #[test]
    fn test_toggle_and_remove_unknown_id() {
        let goals = tracker();
        assert!(matches!(goals.toggle("nope"), Err(Error::NotFound(_))));
        assert!(matches!(goals.remove("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_remove_and_summary() {
        let goals = tracker();
        let a = goals.add("Call a friend", GoalCategory::Social).unwrap();
        let b = goals.add("Plan the week", GoalCategory::Productivity).unwrap();
        goals.add("Stretch", GoalCategory::Health).unwrap();
        goals.toggle(&a).unwrap();

        let summary = goals.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.completion_rate, 33);

        goals.remove(&b).unwrap();
        let summary = goals.summary().unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completion_rate, 50);
    }

    #[test]
    fn test_empty_summary() {
        let summary = tracker().summary().unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completion_rate, 0);
    }
}
