//! Headline counters for the overview view.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::task::Task;
use crate::urgency;

/// Overview statistics across non-completed tasks
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    /// Non-completed tasks
    pub total: usize,
    /// Non-completed tasks with both schedule fields set
    pub scheduled: usize,
    /// Sum of explicitly set durations, in hours to one decimal. Unlike
    /// space metrics, absent durations contribute nothing here.
    pub hours_planned: f64,
    /// Priority 8+ or a deadline strictly within the next 24 hours
    pub urgent: usize,
}

impl OverviewStats {
    pub fn collect(tasks: &[Task], now: NaiveDateTime) -> Self {
        let mut total = 0;
        let mut scheduled = 0;
        let mut minutes: u64 = 0;
        let mut urgent = 0;

        for task in tasks.iter().filter(|task| !task.completed) {
            total += 1;
            if task.is_scheduled() {
                scheduled += 1;
            }
            if let Some(duration) = task.estimated_duration {
                minutes += u64::from(duration);
            }
            if urgency::is_urgent(task, now) {
                urgent += 1;
            }
        }

        Self {
            total,
            scheduled,
            hours_planned: (minutes as f64 / 60.0 * 10.0).round() / 10.0,
            urgent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time")
    }

    #[test]
    fn counts_active_scheduled_and_urgent() {
        let now = now();
        let scheduled = TaskDraft::new("scheduled")
            .duration(90)
            .schedule(now + Duration::hours(1), now + Duration::hours(2))
            .build();
        let urgent = TaskDraft::new("urgent").priority(9).duration(30).build();
        let plain = TaskDraft::new("plain").build();
        let mut done = TaskDraft::new("done").priority(10).duration(600).build();
        done.completed = true;

        let stats = OverviewStats::collect(&[scheduled, urgent, plain, done], now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(stats.urgent, 1);
        // 90 + 30 explicit minutes; the plain task has no explicit duration
        assert_eq!(stats.hours_planned, 2.0);
    }

    #[test]
    fn deadline_within_a_day_is_urgent_but_overdue_is_not() {
        let now = now();
        let soon = TaskDraft::new("soon")
            .priority(2)
            .deadline(now + Duration::hours(3))
            .build();
        let overdue = TaskDraft::new("late")
            .priority(2)
            .deadline(now - Duration::hours(3))
            .build();

        let stats = OverviewStats::collect(&[soon, overdue], now);
        assert_eq!(stats.urgent, 1);
    }

    #[test]
    fn empty_input_yields_zeros() {
        let stats = OverviewStats::collect(&[], now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.scheduled, 0);
        assert_eq!(stats.urgent, 0);
        assert_eq!(stats.hours_planned, 0.0);
    }
}
