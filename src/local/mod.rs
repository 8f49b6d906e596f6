//! Local filesystem backend.
//!
//! Implements the service seams over the JSON collections in the data
//! directory. Task mutations run inside the collection's file lock and
//! append to the change log; space and feed registry changes are not
//! logged, matching the change log's task-only scope.

pub mod scheduler;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

use crate::calendar::ExternalEvent;
use crate::changelog::{self, ChangeAction, ChangeEntry};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::{self, FeedSource};
use crate::service::{EventFeedService, FreezeDayOutcome, SpaceService, TaskService};
use crate::space::{Space, SpaceDraft, SpacePatch, TimeConstraint};
use crate::storage::Storage;
use crate::task::{self, Task, TaskDraft, TaskPatch};

/// Service implementation backed by the local data directory
pub struct LocalBackend {
    storage: Storage,
    config: Config,
}

impl LocalBackend {
    pub fn new(storage: Storage, config: Config) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the change log, newest first
    pub fn recent_changes(&self, limit: usize) -> Result<Vec<ChangeEntry>> {
        let entries = self.storage.read_changes()?;
        Ok(changelog::recent(entries, limit))
    }

    pub fn list_feeds(&self) -> Result<Vec<FeedSource>> {
        self.storage.read_feeds()
    }

    /// Register a feed, checking first that the file actually loads
    pub fn add_feed(&self, name: &str, path: PathBuf) -> Result<FeedSource> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "feed name cannot be empty".to_string(),
            ));
        }
        let feed = FeedSource::new(name, path);
        feed::load_events(&feed)?;

        self.storage.update_feeds(|feeds| {
            if feeds.iter().any(|f| f.name.eq_ignore_ascii_case(&feed.name)) {
                return Err(Error::InvalidArgument(format!(
                    "feed '{}' already exists",
                    feed.name
                )));
            }
            feeds.push(feed.clone());
            Ok(())
        })?;
        debug!(id = %feed.id, name = %feed.name, "feed added");
        Ok(feed)
    }

    /// Flip a feed's enabled flag and return the updated record
    pub fn toggle_feed(&self, id: &str) -> Result<FeedSource> {
        self.storage.update_feeds(|feeds| {
            let feed = feeds
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| Error::FeedNotFound(id.to_string()))?;
            feed.enabled = !feed.enabled;
            Ok(feed.clone())
        })
    }

    pub fn remove_feed(&self, id: &str) -> Result<FeedSource> {
        self.storage.update_feeds(|feeds| {
            let idx = feeds
                .iter()
                .position(|f| f.id == id)
                .ok_or_else(|| Error::FeedNotFound(id.to_string()))?;
            Ok(feeds.remove(idx))
        })
    }

    /// Seed the three default spaces into an empty registry. Runs at most
    /// once; a non-empty registry is left alone.
    pub fn seed_default_spaces(&self) -> Result<usize> {
        self.storage.update_spaces(|spaces| {
            if !spaces.is_empty() {
                return Ok(0);
            }
            let defaults = default_spaces();
            let count = defaults.len();
            spaces.extend(defaults);
            debug!(count, "seeded default spaces");
            Ok(count)
        })
    }
}

#[async_trait]
impl TaskService for LocalBackend {
    async fn list_tasks(&self, include_completed: bool) -> Result<Vec<Task>> {
        let mut tasks = self.storage.read_tasks()?;
        if !include_completed {
            tasks.retain(|t| !t.completed);
        }
        Ok(tasks)
    }

    async fn create_task(&self, draft: TaskDraft) -> Result<Task> {
        let mut draft = draft;
        draft.title = task::normalize_title(&draft.title)?;
        draft.priority = task::clamp_priority(draft.priority);
        task::validate_schedule(draft.scheduled_start, draft.scheduled_end)?;

        let created = self.storage.update_tasks(move |tasks| {
            let mut created = draft.build();
            created.order = tasks.iter().map(|t| t.order).max().map_or(0, |max| max + 1);
            tasks.push(created.clone());
            Ok(created)
        })?;

        self.storage.append_change(
            &ChangeEntry::for_task(ChangeAction::Create, &created.id).with_new(&created)?,
        )?;
        debug!(id = %created.id, title = %created.title, "task created");
        Ok(created)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }

        let (before, after) = self.storage.update_tasks(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            let before = task.clone();
            task::apply_patch(task, &patch)?;
            Ok((before, task.clone()))
        })?;

        self.storage.append_change(
            &ChangeEntry::for_task(ChangeAction::Update, id)
                .with_old(&before)?
                .with_new(&after)?,
        )?;
        debug!(id, "task updated");
        Ok(after)
    }

    async fn delete_task(&self, id: &str) -> Result<Task> {
        let removed = self.storage.update_tasks(|tasks| {
            let idx = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            Ok(tasks.remove(idx))
        })?;

        self.storage.append_change(
            &ChangeEntry::for_task(ChangeAction::Delete, id).with_old(&removed)?,
        )?;
        debug!(id, "task deleted");
        Ok(removed)
    }

    async fn toggle_freeze(&self, id: &str) -> Result<bool> {
        let (before, after) = self.storage.update_tasks(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            let before = task.clone();
            task.frozen = !task.frozen;
            task.updated_at = Utc::now();
            Ok((before, task.clone()))
        })?;

        let action = if after.frozen {
            ChangeAction::Freeze
        } else {
            ChangeAction::Unfreeze
        };
        self.storage.append_change(
            &ChangeEntry::for_task(action, id)
                .with_old(&before)?
                .with_new(&after)?,
        )?;
        debug!(id, frozen = after.frozen, "freeze toggled");
        Ok(after.frozen)
    }

    async fn freeze_day(&self, date: NaiveDate) -> Result<FreezeDayOutcome> {
        let (outcome, touched) = self.storage.update_tasks(|tasks| {
            let hits: Vec<&mut Task> = tasks
                .iter_mut()
                .filter(|t| t.scheduled_start.map(|s| s.date()) == Some(date))
                .collect();
            if hits.is_empty() {
                return Ok((
                    FreezeDayOutcome {
                        affected: 0,
                        frozen: None,
                    },
                    Vec::new(),
                ));
            }

            // Completed tasks count here: the day only thaws once every
            // scheduled task on it, finished or not, is already frozen.
            let target = !hits.iter().all(|t| t.frozen);
            let now = Utc::now();
            let mut touched = Vec::with_capacity(hits.len());
            for task in hits {
                let before = task.clone();
                task.frozen = target;
                task.updated_at = now;
                touched.push((before, task.clone()));
            }
            Ok((
                FreezeDayOutcome {
                    affected: touched.len(),
                    frozen: Some(target),
                },
                touched,
            ))
        })?;

        if let Some(frozen) = outcome.frozen {
            let action = if frozen {
                ChangeAction::Freeze
            } else {
                ChangeAction::Unfreeze
            };
            for (before, after) in &touched {
                self.storage.append_change(
                    &ChangeEntry::for_task(action, &after.id)
                        .with_old(before)?
                        .with_new(after)?,
                )?;
            }
        }
        debug!(%date, affected = outcome.affected, "freeze day applied");
        Ok(outcome)
    }

    async fn reorder_tasks(&self, ids: &[String]) -> Result<usize> {
        let touched = self.storage.update_tasks(|tasks| {
            let now = Utc::now();
            let mut touched = Vec::new();
            for (position, id) in ids.iter().enumerate() {
                // Unknown ids still consume their position so the known
                // tasks keep the caller's relative spacing.
                let Some(task) = tasks.iter_mut().find(|t| &t.id == id) else {
                    continue;
                };
                let before = task.clone();
                task.order = position as u32;
                task.updated_at = now;
                touched.push((before, task.clone()));
            }
            Ok(touched)
        })?;

        for (before, after) in &touched {
            self.storage.append_change(
                &ChangeEntry::for_task(ChangeAction::Reorder, &after.id)
                    .with_old(before)?
                    .with_new(after)?,
            )?;
        }
        debug!(moved = touched.len(), "tasks reordered");
        Ok(touched.len())
    }
}

#[async_trait]
impl SpaceService for LocalBackend {
    async fn list_spaces(&self) -> Result<Vec<Space>> {
        self.storage.read_spaces()
    }

    async fn create_space(&self, draft: SpaceDraft) -> Result<Space> {
        let mut draft = draft;
        draft.name = normalize_space_name(&draft.name)?;
        for constraint in &draft.time_constraints {
            constraint.validate()?;
        }

        let created = self.storage.update_spaces(move |spaces| {
            if spaces.iter().any(|s| s.name.eq_ignore_ascii_case(&draft.name)) {
                return Err(Error::InvalidArgument(format!(
                    "space '{}' already exists",
                    draft.name
                )));
            }
            let created = draft.build();
            spaces.push(created.clone());
            Ok(created)
        })?;
        debug!(id = %created.id, name = %created.name, "space created");
        Ok(created)
    }

    async fn update_space(&self, id: &str, patch: SpacePatch) -> Result<Space> {
        if patch.is_empty() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }
        let mut patch = patch;
        if let Some(name) = &patch.name {
            patch.name = Some(normalize_space_name(name)?);
        }
        if let Some(constraints) = &patch.time_constraints {
            for constraint in constraints {
                constraint.validate()?;
            }
        }

        self.storage.update_spaces(|spaces| {
            if let Some(name) = &patch.name {
                if spaces
                    .iter()
                    .any(|s| s.id != id && s.name.eq_ignore_ascii_case(name))
                {
                    return Err(Error::InvalidArgument(format!(
                        "space '{name}' already exists"
                    )));
                }
            }
            let space = spaces
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| Error::SpaceNotFound(id.to_string()))?;
            if let Some(name) = &patch.name {
                // Tasks keep pointing at the old name; they surface under
                // the unassigned bucket until re-tagged.
                space.name = name.clone();
            }
            if let Some(description) = &patch.description {
                space.description = description.clone();
            }
            if let Some(constraints) = &patch.time_constraints {
                space.time_constraints = constraints.clone();
            }
            Ok(space.clone())
        })
    }

    async fn delete_space(&self, id: &str) -> Result<Space> {
        self.storage.update_spaces(|spaces| {
            let idx = spaces
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| Error::SpaceNotFound(id.to_string()))?;
            Ok(spaces.remove(idx))
        })
    }
}

#[async_trait]
impl EventFeedService for LocalBackend {
    async fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ExternalEvent>> {
        let feeds = self.storage.read_feeds()?;
        feed::collect_events(&feeds, start, end)
    }
}

fn normalize_space_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "space name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn hour(h: i64) -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::hours(h)
}

fn default_spaces() -> Vec<Space> {
    let office = |day| TimeConstraint {
        day,
        start: hour(9),
        end: hour(17),
    };

    let mut work = Space::new("work");
    work.description =
        Some("Work-related tasks, meetings, and projects during office hours".to_string());
    work.time_constraints = (0u8..5).map(office).collect();

    let mut study = Space::new("study");
    study.description =
        Some("Learning activities, courses, homework, and educational tasks".to_string());

    let mut association = Space::new("association");
    association.description =
        Some("Community group, club, or volunteer organization activities".to_string());
    association.time_constraints = vec![TimeConstraint {
        day: 2,
        start: hour(18),
        end: hour(22),
    }];

    vec![work, study, association]
}
