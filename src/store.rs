//! In-memory working set over the backend services.
//!
//! The store caches tasks, spaces, and external events and rebuilds the
//! calendar projection whenever either side changes. It never patches the
//! cache in place: every mutation round-trips through the backend and is
//! followed by a full reload, so the cache always mirrors what the backend
//! persisted. Staleness between reloads is accepted; reloads racing through
//! separate handles settle in completion order, with the fetch that finishes
//! last winning even if it was issued first.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::calendar::{self, CalendarEvent, ExternalEvent};
use crate::error::{Error, Result};
use crate::service::{
    EventFeedService, FreezeDayOutcome, ScheduleOutcome, SchedulerService, SpaceService,
    TaskService,
};
use crate::space::Space;
use crate::task::{self, Task, TaskDraft, TaskPatch};

/// Granularity a resize snaps the estimated duration to
const RESIZE_SNAP_MINUTES: i64 = 15;

pub struct TaskStore {
    task_service: Arc<dyn TaskService>,
    space_service: Arc<dyn SpaceService>,
    feed_service: Arc<dyn EventFeedService>,
    scheduler_service: Arc<dyn SchedulerService>,
    include_completed: bool,
    tasks: Vec<Task>,
    spaces: Vec<Space>,
    external_events: Vec<ExternalEvent>,
    calendar: Vec<CalendarEvent>,
    generation: u64,
}

impl TaskStore {
    pub fn new(
        task_service: Arc<dyn TaskService>,
        space_service: Arc<dyn SpaceService>,
        feed_service: Arc<dyn EventFeedService>,
        scheduler_service: Arc<dyn SchedulerService>,
    ) -> Self {
        Self {
            task_service,
            space_service,
            feed_service,
            scheduler_service,
            include_completed: false,
            tasks: Vec::new(),
            spaces: Vec::new(),
            external_events: Vec::new(),
            calendar: Vec::new(),
            generation: 0,
        }
    }

    /// Cached tasks in display order, as of the last reload
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn external_events(&self) -> &[ExternalEvent] {
        &self.external_events
    }

    pub fn calendar_events(&self) -> &[CalendarEvent] {
        &self.calendar
    }

    /// Bumped on every applied reload; lets callers observe that a refresh
    /// actually happened
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn include_completed(&self) -> bool {
        self.include_completed
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replace the cached task list with a fresh fetch and recompute the
    /// calendar projection from it
    pub async fn reload(&mut self, include_completed: bool) -> Result<()> {
        self.include_completed = include_completed;
        let mut tasks = self.task_service.list_tasks(include_completed).await?;
        task::sort_for_display(&mut tasks);
        self.tasks = tasks;
        self.rebuild_calendar();
        self.generation += 1;
        debug!(
            tasks = self.tasks.len(),
            generation = self.generation,
            "store reloaded"
        );
        Ok(())
    }

    pub async fn reload_spaces(&mut self) -> Result<()> {
        self.spaces = self.space_service.list_spaces().await?;
        self.generation += 1;
        Ok(())
    }

    /// Fetch tasks and external events for a window concurrently, then
    /// rebuild the projection from both. The cache is only touched once both
    /// fetches have succeeded.
    pub async fn refresh_calendar(
        &mut self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<()> {
        let (tasks, events) = tokio::join!(
            self.task_service.list_tasks(self.include_completed),
            self.feed_service.list_events(window_start, window_end),
        );
        let mut tasks = tasks?;
        let events = events?;
        task::sort_for_display(&mut tasks);
        self.tasks = tasks;
        self.external_events = events;
        self.rebuild_calendar();
        self.generation += 1;
        debug!(
            tasks = self.tasks.len(),
            events = self.external_events.len(),
            "calendar refreshed"
        );
        Ok(())
    }

    fn rebuild_calendar(&mut self) {
        self.calendar = calendar::project(&self.tasks, &self.external_events);
    }

    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let created = self.task_service.create_task(draft).await?;
        self.reload(self.include_completed).await?;
        Ok(created)
    }

    pub async fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let updated = self.task_service.update_task(id, patch).await?;
        self.reload(self.include_completed).await?;
        Ok(updated)
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<Task> {
        let removed = self.task_service.delete_task(id).await?;
        self.reload(self.include_completed).await?;
        Ok(removed)
    }

    pub async fn toggle_freeze(&mut self, id: &str) -> Result<bool> {
        let frozen = self.task_service.toggle_freeze(id).await?;
        self.reload(self.include_completed).await?;
        Ok(frozen)
    }

    /// Bulk-freeze a day. Skips the reload when nothing matched, so callers
    /// can report "nothing to do" against an untouched cache.
    pub async fn freeze_day(&mut self, date: NaiveDate) -> Result<FreezeDayOutcome> {
        let outcome = self.task_service.freeze_day(date).await?;
        if outcome.affected > 0 {
            self.reload(self.include_completed).await?;
        }
        Ok(outcome)
    }

    pub async fn reorder_tasks(&mut self, ids: &[String]) -> Result<usize> {
        let moved = self.task_service.reorder_tasks(ids).await?;
        self.reload(self.include_completed).await?;
        Ok(moved)
    }

    /// Move a task to a new slot. Moving pins the task against the
    /// auto-scheduler unless the caller opts out; the opt-out leaves an
    /// existing frozen flag alone rather than clearing it.
    pub async fn reschedule_task(
        &mut self,
        id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        keep_unfrozen: bool,
    ) -> Result<Task> {
        let mut patch = TaskPatch {
            scheduled_start: Some(Some(start)),
            scheduled_end: Some(Some(end)),
            ..TaskPatch::default()
        };
        if !keep_unfrozen {
            patch.frozen = Some(true);
        }
        self.update_task(id, patch).await
    }

    /// Change a scheduled task's end, re-deriving the estimated duration
    /// from the new span snapped to quarter hours. Freezes like a move.
    pub async fn resize_task(
        &mut self,
        id: &str,
        end: NaiveDateTime,
        keep_unfrozen: bool,
    ) -> Result<Task> {
        let start = match self.find_task(id) {
            Some(task) => match task.scheduled_start {
                Some(start) => start,
                None => {
                    return Err(Error::InvalidArgument(format!(
                        "task '{}' is not scheduled, nothing to resize",
                        task.title
                    )))
                }
            },
            None => return Err(Error::TaskNotFound(id.to_string())),
        };
        task::validate_schedule(Some(start), Some(end))?;

        let minutes = snap_minutes(end.signed_duration_since(start));
        let mut patch = TaskPatch {
            scheduled_end: Some(Some(end)),
            estimated_duration: Some(Some(minutes)),
            ..TaskPatch::default()
        };
        if !keep_unfrozen {
            patch.frozen = Some(true);
        }
        self.update_task(id, patch).await
    }

    /// Run the auto-scheduler and, unless this was a dry run, reload to pick
    /// up whatever it placed
    pub async fn run_scheduler(
        &mut self,
        from: NaiveDateTime,
        dry_run: bool,
    ) -> Result<ScheduleOutcome> {
        let outcome = self.scheduler_service.schedule(from, dry_run).await?;
        if !dry_run {
            self.reload(self.include_completed).await?;
        }
        Ok(outcome)
    }
}

/// Round a span to the nearest quarter hour, in minutes
fn snap_minutes(span: Duration) -> u32 {
    let quarters = (span.num_minutes() as f64 / RESIZE_SNAP_MINUTES as f64).round() as i64;
    (quarters * RESIZE_SNAP_MINUTES).max(0) as u32
}
