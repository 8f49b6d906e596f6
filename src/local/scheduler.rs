//! Slot-search auto-scheduler over the local collections.
//!
//! Reassigns every unfrozen, incomplete task to the earliest slot that fits
//! inside its space's availability windows and collides with nothing already
//! booked. Frozen tasks keep their slots and act as obstacles instead, as do
//! external events from enabled feeds.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc};
use tracing::debug;

use crate::changelog::{ChangeAction, ChangeEntry};
use crate::error::Result;
use crate::feed;
use crate::service::{ScheduleOutcome, SchedulerService};
use crate::space::TimeConstraint;
use crate::task::Task;

use super::LocalBackend;

/// Half-open interval already taken on the calendar
#[derive(Debug, Clone, Copy)]
struct BusySlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[async_trait]
impl SchedulerService for LocalBackend {
    async fn schedule(&self, from: NaiveDateTime, dry_run: bool) -> Result<ScheduleOutcome> {
        let slot_minutes = self.config().scheduler.slot_minutes;
        let horizon_days = self.config().scheduler.horizon_days;

        let tasks = self.storage().read_tasks()?;
        let spaces = self.storage().read_spaces()?;
        let feeds = self.storage().read_feeds()?;

        let mut candidates: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.completed && !t.frozen)
            .collect();
        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| match (a.deadline, b.deadline) {
                    (Some(left), Some(right)) => left.cmp(&right),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        let considered = candidates.len();

        // Busy obstacles: frozen scheduled tasks keep their slots. Unfrozen
        // scheduled tasks do not; they are about to be reassigned anyway.
        let mut busy: Vec<BusySlot> = tasks
            .iter()
            .filter(|t| t.frozen && !t.completed)
            .filter_map(|t| match (t.scheduled_start, t.scheduled_end) {
                (Some(start), Some(end)) => Some(BusySlot { start, end }),
                _ => None,
            })
            .collect();

        // Fetch external events out to the farthest point any search can
        // reach: the horizon, or the latest candidate deadline beyond it.
        let mut window_end = from + Duration::days(i64::from(horizon_days));
        for task in &candidates {
            if let Some(deadline) = task.deadline {
                window_end = window_end.max(deadline);
            }
        }
        let events = feed::collect_events(&feeds, from, window_end)?;
        busy.extend(events.iter().map(|e| BusySlot {
            start: e.start,
            end: e.end,
        }));
        busy.sort_by_key(|b| b.start);

        let windows: HashMap<&str, &[TimeConstraint]> = spaces
            .iter()
            .map(|s| (s.name.as_str(), s.time_constraints.as_slice()))
            .collect();

        let origin = round_up_to_slot(from, slot_minutes);
        let mut assignments: Vec<(String, NaiveDateTime, NaiveDateTime)> = Vec::new();
        for task in &candidates {
            let duration = Duration::minutes(i64::from(task.duration_minutes()));
            let task_windows = task
                .space
                .as_deref()
                .and_then(|name| windows.get(name).copied());

            let Some(slot_start) = find_next_slot(
                origin,
                duration,
                &busy,
                task_windows,
                task.deadline,
                slot_minutes,
                horizon_days,
            ) else {
                debug!(id = %task.id, "no slot found, task skipped");
                continue;
            };

            let slot_end = slot_start + duration;
            assignments.push((task.id.clone(), slot_start, slot_end));
            let idx = busy.partition_point(|b| b.start < slot_start);
            busy.insert(
                idx,
                BusySlot {
                    start: slot_start,
                    end: slot_end,
                },
            );
        }

        if !dry_run && !assignments.is_empty() {
            let touched = self.storage().update_tasks(|tasks| {
                let now = Utc::now();
                let mut touched = Vec::new();
                for (id, start, end) in &assignments {
                    let Some(task) = tasks.iter_mut().find(|t| &t.id == id) else {
                        continue;
                    };
                    let before = task.clone();
                    task.scheduled_start = Some(*start);
                    task.scheduled_end = Some(*end);
                    task.updated_at = now;
                    touched.push((before, task.clone()));
                }
                Ok(touched)
            })?;
            for (before, after) in &touched {
                self.storage().append_change(
                    &ChangeEntry::for_task(ChangeAction::Update, &after.id)
                        .with_old(before)?
                        .with_new(after)?,
                )?;
            }
        }

        if !dry_run && feeds.iter().any(|f| f.enabled) {
            let now = Utc::now();
            self.storage().update_feeds(|feeds| {
                for feed in feeds.iter_mut().filter(|f| f.enabled) {
                    feed.last_fetched = Some(now);
                }
                Ok(())
            })?;
        }

        let outcome = ScheduleOutcome {
            scheduled: assignments.len(),
            considered,
            dry_run,
        };
        debug!(
            scheduled = outcome.scheduled,
            considered = outcome.considered,
            dry_run,
            "scheduler pass finished"
        );
        Ok(outcome)
    }
}

/// Zero the seconds, then advance to the next slot boundary; an exact
/// boundary stays put. Boundaries count from midnight, so slot sizes that
/// do not divide an hour still land consistently.
pub(crate) fn round_up_to_slot(dt: NaiveDateTime, slot_minutes: u32) -> NaiveDateTime {
    let slot = i64::from(slot_minutes.max(1));
    let midnight = dt.date().and_time(NaiveTime::MIN);
    let minutes = i64::from(dt.hour()) * 60 + i64::from(dt.minute());
    let remainder = minutes % slot;
    let rounded = if remainder == 0 {
        minutes
    } else {
        minutes + slot - remainder
    };
    midnight + Duration::minutes(rounded)
}

fn overlaps(
    start1: NaiveDateTime,
    end1: NaiveDateTime,
    start2: NaiveDateTime,
    end2: NaiveDateTime,
) -> bool {
    start1 < end2 && end1 > start2
}

/// Whether `[start, end)` sits entirely inside one of the windows on
/// `start`'s weekday. `None` or an empty list means no restriction.
fn fits_windows(
    start: NaiveDateTime,
    end: NaiveDateTime,
    windows: Option<&[TimeConstraint]>,
) -> bool {
    let Some(windows) = windows else {
        return true;
    };
    if windows.is_empty() {
        return true;
    }
    let day = start.weekday().num_days_from_monday() as u8;
    windows.iter().any(|w| {
        w.day == day && start >= start.date().and_time(w.start) && end <= start.date().and_time(w.end)
    })
}

/// Earliest window start at or after `current` within the horizon
fn next_window_start(
    current: NaiveDateTime,
    windows: Option<&[TimeConstraint]>,
    horizon_days: u32,
) -> Option<NaiveDateTime> {
    let Some(windows) = windows else {
        return Some(current);
    };
    if windows.is_empty() {
        return Some(current);
    }
    for days_ahead in 0..i64::from(horizon_days) {
        let date = current.date() + Duration::days(days_ahead);
        let day = date.weekday().num_days_from_monday() as u8;
        for window in windows {
            if window.day == day {
                let start = date.and_time(window.start);
                if start >= current {
                    return Some(start);
                }
            }
        }
    }
    None
}

/// Walk forward from `from` until the duration fits a window and overlaps
/// nothing busy. Search stops at `deadline - duration` when a deadline
/// exists, else at `from + horizon_days`.
fn find_next_slot(
    from: NaiveDateTime,
    duration: Duration,
    busy: &[BusySlot],
    windows: Option<&[TimeConstraint]>,
    deadline: Option<NaiveDateTime>,
    slot_minutes: u32,
    horizon_days: u32,
) -> Option<NaiveDateTime> {
    let bound = match deadline {
        Some(deadline) => deadline - duration,
        None => from + Duration::days(i64::from(horizon_days)),
    };

    let mut current = from;
    while current < bound {
        let slot_end = current + duration;

        if !fits_windows(current, slot_end, windows) {
            let next = next_window_start(current, windows, horizon_days)?;
            // A window too short for the duration hands back the same start
            // forever; force progress by one slot instead of stalling.
            current = if next > current {
                next
            } else {
                round_up_to_slot(
                    current + Duration::minutes(i64::from(slot_minutes)),
                    slot_minutes,
                )
            };
            continue;
        }

        match busy
            .iter()
            .find(|b| overlaps(current, slot_end, b.start, b.end))
        {
            Some(block) => current = round_up_to_slot(block.end, slot_minutes),
            None => return Some(current),
        }
    }
    None
}
