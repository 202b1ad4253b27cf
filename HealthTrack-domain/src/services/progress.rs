//! Goal progress and habit streak arithmetic.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

/// Percentage of `target` reached by `current`, clamped to [0, 100].
///
/// A non-positive target or a non-finite input yields 0.
pub fn goal_progress_percent(current: f64, target: f64) -> f64 {
    if !current.is_finite() || !target.is_finite() || target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// Whole-number share of completed check-ins, never above 100
pub fn completion_rate(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (f64::from(completed) / f64::from(total) * 100.0).round() as u32;
    rate.min(100)
}

/// Consecutive completed days ending today, or ending yesterday when today
/// has not been checked in yet.
pub fn current_streak(completed_dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = completed_dates.iter().copied().collect();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive completed days. Duplicate dates count once.
pub fn longest_streak(completed_dates: &[NaiveDate]) -> u32 {
    let days: BTreeSet<NaiveDate> = completed_dates.iter().copied().collect();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
