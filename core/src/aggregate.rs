//! Pure aggregation over meal-log and goal snapshots. Entry order never
//! affects a result.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::clock::local_date;
use crate::models::{
    CategoryGroup, DailySummary, DayTotal, GoalSummary, GrowthGoal, MealCategory, MealEntry,
};

#[must_use]
pub fn consumed_total(entries: &[MealEntry]) -> u64 {
    entries.iter().map(|e| u64::from(e.calories)).sum()
}

#[must_use]
pub fn remaining(goal: u32, consumed: u64) -> u64 {
    u64::from(goal).saturating_sub(consumed)
}

/// Rounded share of the goal consumed, clamped to 100.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn progress_percentage(goal: u32, consumed: u64) -> u8 {
    if goal == 0 {
        return 0;
    }
    let pct = (100.0 * consumed as f64 / f64::from(goal)).round();
    pct.min(100.0) as u8
}

#[must_use]
pub fn is_over_goal(goal: u32, consumed: u64) -> bool {
    consumed > u64::from(goal)
}

/// Calories per category, always covering every category. Entries already
/// resolve unknown tags to the fallback bucket when they are parsed.
#[must_use]
pub fn category_totals(entries: &[MealEntry]) -> BTreeMap<MealCategory, u64> {
    let mut totals: BTreeMap<MealCategory, u64> =
        MealCategory::ALL.iter().map(|&c| (c, 0)).collect();
    for entry in entries {
        *totals.entry(entry.category).or_insert(0) += u64::from(entry.calories);
    }
    totals
}

#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn completion_rate(goals: &[GrowthGoal]) -> u8 {
    if goals.is_empty() {
        return 0;
    }
    let completed = goals.iter().filter(|g| g.completed).count();
    (100.0 * completed as f64 / goals.len().max(1) as f64).round() as u8
}

#[must_use]
pub fn goal_summary(goals: &[GrowthGoal]) -> GoalSummary {
    let completed = goals.iter().filter(|g| g.completed).count();
    GoalSummary {
        total: goals.len(),
        completed,
        remaining: goals.len() - completed,
        completion_rate: completion_rate(goals),
    }
}

#[must_use]
pub fn daily_summary(date: NaiveDate, daily_goal: u32, entries: &[MealEntry]) -> DailySummary {
    let consumed = consumed_total(entries);
    let mut meals = Vec::new();

    for (category, subtotal_calories) in category_totals(entries) {
        let mut group: Vec<MealEntry> = entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        meals.push(CategoryGroup {
            category,
            entries: group,
            subtotal_calories,
        });
    }

    DailySummary {
        date,
        daily_goal,
        consumed,
        remaining: remaining(daily_goal, consumed),
        progress_percentage: progress_percentage(daily_goal, consumed),
        over_goal: is_over_goal(daily_goal, consumed),
        meals,
        total_protein: entries.iter().map(|e| e.protein).sum(),
        total_carbs: entries.iter().map(|e| e.carbs).sum(),
        total_fat: entries.iter().map(|e| e.fat).sum(),
    }
}

/// Per-day totals for the `days` days ending at `today`, oldest first,
/// zero-filled.
#[must_use]
pub fn day_totals(entries: &[MealEntry], today: NaiveDate, days: u32) -> Vec<DayTotal> {
    let mut by_day: BTreeMap<NaiveDate, (u64, usize)> = BTreeMap::new();
    for entry in entries {
        let slot = by_day.entry(local_date(entry.timestamp)).or_default();
        slot.0 += u64::from(entry.calories);
        slot.1 += 1;
    }

    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            let (calories, count) = by_day.get(&date).copied().unwrap_or_default();
            DayTotal {
                date,
                calories,
                entries: count,
            }
        })
        .collect()
}
