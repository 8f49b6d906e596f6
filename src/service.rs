//! Service seams between the core engine and its backends.
//!
//! The store talks to these traits only; the file-backed implementation
//! lives in [`crate::local`] and tests substitute their own.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::calendar::ExternalEvent;
use crate::error::Result;
use crate::space::{Space, SpaceDraft, SpacePatch};
use crate::task::{Task, TaskDraft, TaskPatch};

/// Outcome of a day-level freeze toggle
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FreezeDayOutcome {
    /// Tasks whose flag was set
    pub affected: usize,
    /// Resulting state for the batch; `None` when no tasks matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,
}

/// Outcome of an auto-scheduler run
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScheduleOutcome {
    /// Tasks that received a slot
    pub scheduled: usize,
    /// Candidates examined
    pub considered: usize,
    /// Whether the run skipped persistence
    pub dry_run: bool,
}

/// Task mutations and queries
#[async_trait]
pub trait TaskService: Send + Sync {
    /// All tasks, optionally including completed ones
    async fn list_tasks(&self, include_completed: bool) -> Result<Vec<Task>>;

    async fn create_task(&self, draft: TaskDraft) -> Result<Task>;

    /// Apply a partial update; only provided fields change
    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task>;

    /// Remove a task, returning the removed record
    async fn delete_task(&self, id: &str) -> Result<Task>;

    /// Flip the frozen flag, returning the new state
    async fn toggle_freeze(&self, id: &str) -> Result<bool>;

    /// Uniformly freeze or unfreeze every task scheduled on `date`;
    /// the direction is the backend's decision
    async fn freeze_day(&self, date: NaiveDate) -> Result<FreezeDayOutcome>;

    /// Assign display order by position in `ids`; unknown ids are skipped
    /// but still consume their position. Returns the number applied.
    async fn reorder_tasks(&self, ids: &[String]) -> Result<usize>;
}

/// Space mutations and queries
#[async_trait]
pub trait SpaceService: Send + Sync {
    async fn list_spaces(&self) -> Result<Vec<Space>>;

    async fn create_space(&self, draft: SpaceDraft) -> Result<Space>;

    async fn update_space(&self, id: &str, patch: SpacePatch) -> Result<Space>;

    /// Remove a space, returning the removed record. Tasks referencing it
    /// keep their dangling name.
    async fn delete_space(&self, id: &str) -> Result<Space>;
}

/// Read-only external events
#[async_trait]
pub trait EventFeedService: Send + Sync {
    /// Events intersecting `[start, end)` across all enabled feeds
    async fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ExternalEvent>>;
}

/// The opaque "schedule now" operation
#[async_trait]
pub trait SchedulerService: Send + Sync {
    /// Reassign slots for unfrozen, incomplete tasks starting at `from`
    async fn schedule(&self, from: NaiveDateTime, dry_run: bool) -> Result<ScheduleOutcome>;
}
