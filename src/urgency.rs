//! Urgency scoring and ranking for tasks.
//!
//! Combines priority with deadline proximity into a single score used to
//! order tasks for display. Ranking never mutates the stored `order` field.

use chrono::NaiveDateTime;

use crate::task::Task;

/// Weight applied to the task priority
const PRIORITY_WEIGHT: i64 = 10;

/// Bonus for a deadline already in the past
const BONUS_OVERDUE: i64 = 1000;
/// Bonus for a deadline within the next 24 hours
const BONUS_WITHIN_DAY: i64 = 500;
/// Bonus for a deadline within the next 48 hours
const BONUS_WITHIN_TWO_DAYS: i64 = 200;
/// Bonus for a deadline within the next week
const BONUS_WITHIN_WEEK: i64 = 100;

const DAY_SECONDS: i64 = 24 * 3600;
const TWO_DAY_SECONDS: i64 = 48 * 3600;
const WEEK_SECONDS: i64 = 168 * 3600;

/// Urgency score for a single task at the given time
///
/// Priorities are clamped to 1..=10 at the entry points, but any stored
/// integer is scored as-is rather than rejected.
pub fn urgency_score(task: &Task, now: NaiveDateTime) -> i64 {
    i64::from(task.priority) * PRIORITY_WEIGHT + deadline_bonus(task.deadline, now)
}

fn deadline_bonus(deadline: Option<NaiveDateTime>, now: NaiveDateTime) -> i64 {
    let Some(deadline) = deadline else {
        return 0;
    };

    let remaining = deadline.signed_duration_since(now).num_seconds();
    if remaining < 0 {
        BONUS_OVERDUE
    } else if remaining <= DAY_SECONDS {
        BONUS_WITHIN_DAY
    } else if remaining <= TWO_DAY_SECONDS {
        BONUS_WITHIN_TWO_DAYS
    } else if remaining <= WEEK_SECONDS {
        BONUS_WITHIN_WEEK
    } else {
        0
    }
}

/// Return tasks ordered by descending urgency score
///
/// The sort is stable: tasks with equal scores keep their input order.
pub fn rank(tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
    let mut ranked = tasks.to_vec();
    ranked.sort_by(|left, right| urgency_score(right, now).cmp(&urgency_score(left, now)));
    ranked
}

/// Whether a task counts as urgent for overview statistics: priority 8+
/// or a deadline strictly within the next 24 hours. An overdue deadline
/// does not qualify through the deadline branch.
pub fn is_urgent(task: &Task, now: NaiveDateTime) -> bool {
    if task.priority >= 8 {
        return true;
    }
    match task.deadline {
        Some(deadline) => {
            let remaining = deadline.signed_duration_since(now).num_seconds();
            remaining > 0 && remaining <= DAY_SECONDS
        }
        None => false,
    }
}
