//! Calendar projection: merges scheduled tasks and read-only external
//! events into one renderable event set.
//!
//! Projections are derived, never persisted, and rebuilt wholesale on
//! every refresh.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Marker prepended to frozen task titles
pub const FROZEN_PREFIX: &str = "\u{2744}\u{fe0f} ";

fn default_event_title() -> String {
    "Untitled Event".to_string()
}

/// A read-only event from a subscribed feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalEvent {
    #[serde(default = "default_event_title")]
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub description: String,
}

/// Display class for a projected event; completed wins over frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    Completed,
    Frozen,
    Plain,
    External,
}

/// Back-reference from a projected event to its source.
///
/// External identity is positional: the index is only meaningful within
/// the projection it came from and must not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSource {
    Task { id: String },
    External { index: usize },
}

/// One renderable calendar event
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub class: EventClass,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: EventSource,
}

/// Project tasks and external events into calendar events.
///
/// Only tasks with both schedule fields become events. Completed tasks are
/// not editable; frozen tasks are, since freezing restricts the scheduler
/// rather than manual edits. Task events come first in input order, then
/// external events in input order.
pub fn project(tasks: &[Task], external: &[ExternalEvent]) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for task in tasks {
        let (Some(start), Some(end)) = (task.scheduled_start, task.scheduled_end) else {
            continue;
        };

        let title = if task.frozen {
            format!("{FROZEN_PREFIX}{}", task.title)
        } else {
            task.title.clone()
        };
        let class = if task.completed {
            EventClass::Completed
        } else if task.frozen {
            EventClass::Frozen
        } else {
            EventClass::Plain
        };

        events.push(CalendarEvent {
            id: format!("task-{}", task.id),
            title,
            start,
            end,
            class,
            editable: !task.completed,
            description: None,
            source: EventSource::Task {
                id: task.id.clone(),
            },
        });
    }

    for (index, event) in external.iter().enumerate() {
        events.push(CalendarEvent {
            id: format!("external-{index}"),
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            class: EventClass::External,
            editable: false,
            description: Some(event.description.clone()),
            source: EventSource::External { index },
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .expect("date")
            .and_hms_opt(hour, 0, 0)
            .expect("time")
    }

    fn external(title: &str) -> ExternalEvent {
        ExternalEvent {
            title: title.to_string(),
            start: at(9),
            end: at(10),
            description: String::new(),
        }
    }

    #[test]
    fn unscheduled_tasks_never_project() {
        let unscheduled = TaskDraft::new("later").build();
        let mut half = TaskDraft::new("half").build();
        half.scheduled_start = Some(at(9));

        let events = project(&[unscheduled, half], &[]);
        assert!(events.is_empty());
    }

    #[test]
    fn scheduled_task_projects_with_task_identity() {
        let task = TaskDraft::new("standup").schedule(at(9), at(10)).build();
        let events = project(std::slice::from_ref(&task), &[]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, format!("task-{}", task.id));
        assert_eq!(events[0].title, "standup");
        assert_eq!(events[0].class, EventClass::Plain);
        assert!(events[0].editable);
        assert_eq!(
            events[0].source,
            EventSource::Task {
                id: task.id.clone()
            }
        );
    }

    #[test]
    fn frozen_tasks_keep_editable_but_gain_marker() {
        let mut task = TaskDraft::new("deep work").schedule(at(9), at(11)).build();
        task.frozen = true;

        let events = project(&[task], &[]);
        assert_eq!(events[0].title, format!("{FROZEN_PREFIX}deep work"));
        assert_eq!(events[0].class, EventClass::Frozen);
        assert!(events[0].editable);
    }

    #[test]
    fn completed_wins_over_frozen() {
        let mut task = TaskDraft::new("done").schedule(at(9), at(10)).build();
        task.frozen = true;
        task.completed = true;

        let events = project(&[task], &[]);
        // Marker follows the frozen flag even when completed
        assert_eq!(events[0].title, format!("{FROZEN_PREFIX}done"));
        assert_eq!(events[0].class, EventClass::Completed);
        assert!(!events[0].editable);
    }

    #[test]
    fn external_events_are_positional_and_read_only() {
        let events = project(&[], &[external("gym"), external("call")]);

        assert_eq!(events[0].id, "external-0");
        assert_eq!(events[1].id, "external-1");
        for event in &events {
            assert_eq!(event.class, EventClass::External);
            assert!(!event.editable);
        }
        assert_eq!(events[1].source, EventSource::External { index: 1 });
    }

    #[test]
    fn tasks_come_before_external_events() {
        let task = TaskDraft::new("focus").schedule(at(13), at(14)).build();
        let events = project(&[task], &[external("gym")]);

        assert!(matches!(events[0].source, EventSource::Task { .. }));
        assert!(matches!(events[1].source, EventSource::External { .. }));
    }

    #[test]
    fn missing_feed_fields_take_defaults() {
        let parsed: ExternalEvent = serde_json::from_str(
            r#"{"start": "2026-03-02T09:00:00", "end": "2026-03-02T10:00:00"}"#,
        )
        .expect("event");
        assert_eq!(parsed.title, "Untitled Event");
        assert_eq!(parsed.description, "");
    }
}
