//! Append-only audit trail of task mutations.
//!
//! Entries are JSONL records in `changelog.jsonl`, one per applied change,
//! carrying JSON snapshots of the task before and after where applicable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Result;

/// Default number of entries shown by the log view
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// What kind of mutation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
    Freeze,
    Unfreeze,
    Reorder,
}

/// One change log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: ChangeAction,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
}

impl ChangeEntry {
    /// Build an entry for a task mutation
    pub fn for_task(action: ChangeAction, task_id: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            timestamp: Utc::now(),
            action,
            entity_type: "task".to_string(),
            entity_id: task_id.into(),
            old_value: None,
            new_value: None,
        }
    }

    /// Attach a snapshot of the entity before the change
    pub fn with_old<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.old_value = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Attach a snapshot of the entity after the change
    pub fn with_new<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.new_value = Some(serde_json::to_value(value)?);
        Ok(self)
    }
}

/// Most recent entries first, truncated to `limit`
pub fn recent(mut entries: Vec<ChangeEntry>, limit: usize) -> Vec<ChangeEntry> {
    entries.sort_by(|left, right| {
        right
            .timestamp
            .cmp(&left.timestamp)
            .then_with(|| right.id.cmp(&left.id))
    });
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_actions_snake_case() {
        let entry = ChangeEntry::for_task(ChangeAction::Unfreeze, "01ABC");
        let json = serde_json::to_value(&entry).expect("json");
        assert_eq!(json["action"], "unfreeze");
        assert_eq!(json["entity_type"], "task");
        assert_eq!(json["entity_id"], "01ABC");
        // Absent snapshots are omitted entirely
        assert!(json.get("old_value").is_none());
        assert!(json.get("new_value").is_none());
    }

    #[test]
    fn snapshots_round_trip() {
        let entry = ChangeEntry::for_task(ChangeAction::Update, "01ABC")
            .with_old(&serde_json::json!({"frozen": false}))
            .expect("old")
            .with_new(&serde_json::json!({"frozen": true}))
            .expect("new");

        let line = serde_json::to_string(&entry).expect("serialize");
        let back: ChangeEntry = serde_json::from_str(&line).expect("deserialize");
        assert_eq!(back.old_value.expect("old")["frozen"], false);
        assert_eq!(back.new_value.expect("new")["frozen"], true);
    }

    #[test]
    fn recent_orders_newest_first_and_truncates() {
        let mut entries = Vec::new();
        for i in 0..5 {
            let mut entry = ChangeEntry::for_task(ChangeAction::Create, format!("task-{i}"));
            entry.timestamp = Utc::now() + chrono::Duration::seconds(i);
            entries.push(entry);
        }

        let recent = recent(entries, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].entity_id, "task-4");
        assert_eq!(recent[2].entity_id, "task-2");
    }
}
