//! External calendar feeds.
//!
//! A feed is a registered local JSON file holding an array of events.
//! Feeds can be disabled without being removed; `last_fetched` records
//! when the auto-scheduler last consumed the feed.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::calendar::ExternalEvent;
use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

/// A registered event feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetched: Option<DateTime<Utc>>,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            path,
            enabled: true,
            created_at: Utc::now(),
            last_fetched: None,
        }
    }
}

/// Read and parse one feed file
pub fn load_events(feed: &FeedSource) -> Result<Vec<ExternalEvent>> {
    let content = std::fs::read_to_string(&feed.path).map_err(|err| Error::FeedUnavailable {
        name: feed.name.clone(),
        message: format!("{}: {err}", feed.path.display()),
    })?;
    serde_json::from_str(&content).map_err(|err| Error::FeedUnavailable {
        name: feed.name.clone(),
        message: format!("{}: {err}", feed.path.display()),
    })
}

/// Events from all enabled feeds that intersect `[start, end)`, in feed
/// order then file order. Fails as a unit on the first unreadable feed.
pub fn collect_events(
    feeds: &[FeedSource],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<ExternalEvent>> {
    let mut events = Vec::new();
    for feed in feeds.iter().filter(|feed| feed.enabled) {
        for event in load_events(feed)? {
            if event.start < end && event.end > start {
                events.push(event);
            }
        }
    }
    Ok(events)
}

/// Resolve a user-supplied feed reference: exact id, exact name, or
/// unique id prefix
pub fn resolve_feed_id(feeds: &[FeedSource], input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("feed id cannot be empty".to_string()));
    }

    let needle = trimmed.to_ascii_lowercase();
    let mut matches: Vec<String> = Vec::new();

    for feed in feeds {
        let id_norm = feed.id.to_ascii_lowercase();
        if id_norm == needle || feed.name == trimmed {
            return Ok(feed.id.clone());
        }
        if id_norm.starts_with(&needle) {
            matches.push(feed.id.clone());
        }
    }

    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(Error::FeedNotFound(trimmed.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::InvalidArgument(format!(
            "ambiguous feed id '{}': {}",
            trimmed,
            matches.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .expect("date")
            .and_hms_opt(hour, 0, 0)
            .expect("time")
    }

    fn write_feed(dir: &TempDir, name: &str, body: &str) -> FeedSource {
        let path = dir.path().join(format!("{name}.json"));
        fs::write(&path, body).expect("write feed file");
        FeedSource::new(name, path)
    }

    #[test]
    fn collects_events_within_window() {
        let dir = TempDir::new().expect("tempdir");
        let feed = write_feed(
            &dir,
            "personal",
            r#"[
                {"title": "gym", "start": "2026-03-02T09:00:00", "end": "2026-03-02T10:00:00"},
                {"title": "trip", "start": "2026-04-10T09:00:00", "end": "2026-04-10T18:00:00"}
            ]"#,
        );

        let events = collect_events(&[feed], at(1, 0), at(7, 0)).expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "gym");
    }

    #[test]
    fn disabled_feeds_are_skipped() {
        let dir = TempDir::new().expect("tempdir");
        let mut feed = write_feed(
            &dir,
            "personal",
            r#"[{"title": "gym", "start": "2026-03-02T09:00:00", "end": "2026-03-02T10:00:00"}]"#,
        );
        feed.enabled = false;

        let events = collect_events(&[feed], at(1, 0), at(7, 0)).expect("events");
        assert!(events.is_empty());
    }

    #[test]
    fn missing_file_is_a_feed_error() {
        let feed = FeedSource::new("gone", PathBuf::from("/nonexistent/feed.json"));
        let err = collect_events(&[feed], at(1, 0), at(7, 0)).expect_err("missing file");
        assert!(matches!(err, Error::FeedUnavailable { .. }));
        assert_eq!(err.exit_code(), crate::error::exit_codes::SERVICE_ERROR);
    }

    #[test]
    fn malformed_json_is_a_feed_error() {
        let dir = TempDir::new().expect("tempdir");
        let feed = write_feed(&dir, "broken", "{not json");
        let err = load_events(&feed).expect_err("malformed");
        assert!(matches!(err, Error::FeedUnavailable { .. }));
    }

    #[test]
    fn resolves_by_name_id_and_prefix() {
        let mut first = FeedSource::new("personal", PathBuf::from("a.json"));
        first.id = "01AAA".to_string();
        let mut second = FeedSource::new("team", PathBuf::from("b.json"));
        second.id = "01BBB".to_string();
        let feeds = vec![first, second];

        assert_eq!(resolve_feed_id(&feeds, "personal").expect("name"), "01AAA");
        assert_eq!(resolve_feed_id(&feeds, "01bbb").expect("id"), "01BBB");
        assert_eq!(resolve_feed_id(&feeds, "01b").expect("prefix"), "01BBB");

        let err = resolve_feed_id(&feeds, "01").expect_err("ambiguous");
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = resolve_feed_id(&feeds, "nope").expect_err("missing");
        assert!(matches!(err, Error::FeedNotFound(_)));
    }
}
