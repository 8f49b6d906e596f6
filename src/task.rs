//! Task model for tempo.
//!
//! Tasks live in `tasks.json` as one whole-file collection. Schedule
//! positions (`deadline`, `scheduled_start`, `scheduled_end`) are naive
//! wall-clock datetimes; audit timestamps are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Minutes assumed for a task with no explicit duration
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Priority bounds enforced at the entry points; stored values outside this
/// range are tolerated downstream
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;

/// Priority assigned when none is given
pub const DEFAULT_PRIORITY: i32 = 5;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// A single task record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Weak reference to a space by name; renames orphan this reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Minutes; absent means [`DEFAULT_DURATION_MINUTES`] for metric and
    /// scheduling purposes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub frozen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end: Option<NaiveDateTime>,
    /// Display rank; mutated only by reordering
    #[serde(default)]
    pub order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Effective duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.estimated_duration.unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// Whether both schedule fields are present
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_start.is_some() && self.scheduled_end.is_some()
    }
}

/// Fields for creating a new task
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub space: Option<String>,
    pub priority: i32,
    pub estimated_duration: Option<u32>,
    pub deadline: Option<NaiveDateTime>,
    pub scheduled_start: Option<NaiveDateTime>,
    pub scheduled_end: Option<NaiveDateTime>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            space: None,
            priority: DEFAULT_PRIORITY,
            estimated_duration: None,
            deadline: None,
            scheduled_start: None,
            scheduled_end: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = Some(minutes);
        self
    }

    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn schedule(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.scheduled_start = Some(start);
        self.scheduled_end = Some(end);
        self
    }

    /// Materialize the draft into a task with a fresh id. Field validation
    /// is the caller's concern.
    pub fn build(self) -> Task {
        let now = Utc::now();
        Task {
            id: Ulid::new().to_string(),
            title: self.title,
            description: self.description,
            space: self.space,
            priority: self.priority,
            estimated_duration: self.estimated_duration,
            deadline: self.deadline,
            completed: false,
            frozen: false,
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task; `None` leaves a field untouched, the inner
/// option on clearable fields distinguishes "set" from "clear"
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub space: Option<Option<String>>,
    pub priority: Option<i32>,
    pub estimated_duration: Option<Option<u32>>,
    pub deadline: Option<Option<NaiveDateTime>>,
    pub completed: Option<bool>,
    pub frozen: Option<bool>,
    pub scheduled_start: Option<Option<NaiveDateTime>>,
    pub scheduled_end: Option<Option<NaiveDateTime>>,
    pub order: Option<u32>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.space.is_none()
            && self.priority.is_none()
            && self.estimated_duration.is_none()
            && self.deadline.is_none()
            && self.completed.is_none()
            && self.frozen.is_none()
            && self.scheduled_start.is_none()
            && self.scheduled_end.is_none()
            && self.order.is_none()
    }
}

/// Merge a patch into a task, validating the merged schedule pair and
/// refreshing `updated_at`
pub fn apply_patch(task: &mut Task, patch: &TaskPatch) -> Result<()> {
    let start = patch.scheduled_start.unwrap_or(task.scheduled_start);
    let end = patch.scheduled_end.unwrap_or(task.scheduled_end);
    validate_schedule(start, end)?;

    if let Some(title) = &patch.title {
        task.title = normalize_title(title)?;
    }
    if let Some(description) = &patch.description {
        task.description = description.clone();
    }
    if let Some(space) = &patch.space {
        task.space = space.clone();
    }
    if let Some(priority) = patch.priority {
        task.priority = clamp_priority(priority);
    }
    if let Some(duration) = patch.estimated_duration {
        task.estimated_duration = duration;
    }
    if let Some(deadline) = patch.deadline {
        task.deadline = deadline;
    }
    if let Some(completed) = patch.completed {
        task.completed = completed;
    }
    if let Some(frozen) = patch.frozen {
        task.frozen = frozen;
    }
    task.scheduled_start = start;
    task.scheduled_end = end;
    if let Some(order) = patch.order {
        task.order = order;
    }
    task.updated_at = Utc::now();
    Ok(())
}

/// Validate the schedule pair invariant: both present or both absent,
/// and end strictly after start
pub fn validate_schedule(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<()> {
    match (start, end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if end <= start {
                return Err(Error::InvalidArgument(format!(
                    "scheduled_end must be after scheduled_start ({start} >= {end})"
                )));
            }
            Ok(())
        }
        _ => Err(Error::InvalidArgument(
            "scheduled_start and scheduled_end must be set together".to_string(),
        )),
    }
}

/// Trim and reject empty titles
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Clamp a priority into the allowed range
pub fn clamp_priority(priority: i32) -> i32 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}

/// Sort tasks into display order: `order` ascending, then creation time,
/// then id for a total order
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.order
            .cmp(&right.order)
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    });
}

/// Resolve a user-supplied task id or unique id prefix against a collection
pub fn resolve_task_id(tasks: &[Task], input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }

    let needle = trimmed.to_ascii_lowercase();
    let mut matches: Vec<String> = Vec::new();

    for task in tasks {
        let id_norm = task.id.to_ascii_lowercase();
        if id_norm == needle {
            return Ok(task.id.clone());
        }
        if id_norm.starts_with(&needle) {
            matches.push(task.id.clone());
        }
    }

    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(Error::TaskNotFound(trimmed.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::InvalidArgument(format!(
            "ambiguous task id '{}': {}",
            trimmed,
            matches.join(", ")
        ))),
    }
}
