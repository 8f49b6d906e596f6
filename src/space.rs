//! Spaces: organizational buckets for tasks, with optional availability
//! windows, plus the per-space metrics and layout engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::task::Task;

/// Name of the synthetic bucket for tasks without a matching space
pub const UNASSIGNED_SPACE: &str = "Unassigned";

/// Blend weights for the layout size ratio
const COUNT_WEIGHT: f64 = 0.7;
const TIME_WEIGHT: f64 = 0.3;

const DAY_NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// A user-defined space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    /// Unique; the join key from `Task.space`
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Availability windows; advisory for display, binding for the scheduler
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_constraints: Vec<TimeConstraint>,
    pub created_at: DateTime<Utc>,
}

impl Space {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            description: None,
            time_constraints: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// One weekly availability window. Days count from Monday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConstraint {
    pub day: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeConstraint {
    pub fn validate(&self) -> Result<()> {
        if self.day > 6 {
            return Err(Error::InvalidArgument(format!(
                "constraint day must be 0-6 (Monday=0), got {}",
                self.day
            )));
        }
        if self.end <= self.start {
            return Err(Error::InvalidArgument(format!(
                "constraint end must be after start ({} >= {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TimeConstraint {
    /// Renders in the same `mon:09:00-17:00` shape the parser accepts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = DAY_NAMES
            .get(usize::from(self.day))
            .copied()
            .unwrap_or("day?");
        write!(
            f,
            "{day}:{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeConstraint {
    type Err = Error;

    /// Parse `mon:09:00-17:00` style windows
    fn from_str(raw: &str) -> Result<Self> {
        let invalid = || {
            Error::InvalidArgument(format!(
                "invalid window '{raw}': expected <day>:<start>-<end>, e.g. mon:09:00-17:00"
            ))
        };

        let (day_part, times) = raw.split_once(':').ok_or_else(invalid)?;
        let (start_part, end_part) = times.split_once('-').ok_or_else(invalid)?;

        let day_norm = day_part.trim().to_ascii_lowercase();
        let day = DAY_NAMES
            .iter()
            .position(|name| *name == day_norm)
            .map(|idx| idx as u8)
            .or_else(|| day_norm.parse::<u8>().ok())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid day '{}': expected mon-sun or 0-6",
                    day_part.trim()
                ))
            })?;

        let start = NaiveTime::parse_from_str(start_part.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end_part.trim(), "%H:%M").map_err(|_| invalid())?;

        let constraint = TimeConstraint { day, start, end };
        constraint.validate()?;
        Ok(constraint)
    }
}

/// Fields for creating a new space
#[derive(Debug, Clone)]
pub struct SpaceDraft {
    pub name: String,
    pub description: Option<String>,
    pub time_constraints: Vec<TimeConstraint>,
}

impl SpaceDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            time_constraints: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn window(mut self, constraint: TimeConstraint) -> Self {
        self.time_constraints.push(constraint);
        self
    }

    /// Materialize the draft into a space with a fresh id. Name uniqueness
    /// is the caller's concern.
    pub fn build(self) -> Space {
        Space {
            id: Ulid::new().to_string(),
            name: self.name,
            description: self.description,
            time_constraints: self.time_constraints,
            created_at: Utc::now(),
        }
    }
}

/// Partial update for a space
#[derive(Debug, Clone, Default)]
pub struct SpacePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub time_constraints: Option<Vec<TimeConstraint>>,
}

impl SpacePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.time_constraints.is_none()
    }
}

/// Resolve a user-supplied space reference: exact id, exact name, or
/// unique id prefix
pub fn resolve_space_id(spaces: &[Space], input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "space id cannot be empty".to_string(),
        ));
    }

    let needle = trimmed.to_ascii_lowercase();
    let mut matches: Vec<String> = Vec::new();

    for space in spaces {
        let id_norm = space.id.to_ascii_lowercase();
        if id_norm == needle || space.name == trimmed {
            return Ok(space.id.clone());
        }
        if id_norm.starts_with(&needle) {
            matches.push(space.id.clone());
        }
    }

    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(Error::SpaceNotFound(trimmed.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::InvalidArgument(format!(
            "ambiguous space id '{}': {}",
            trimmed,
            matches.join(", ")
        ))),
    }
}

/// Aggregated metrics for one space bucket
#[derive(Debug, Clone, Serialize)]
pub struct SpaceMetric {
    pub name: String,
    pub task_count: usize,
    pub total_minutes: u64,
    /// `total_minutes / 60` rounded to one decimal
    pub total_hours: f64,
    /// Blended share of tasks and time, 0.0..=1.0
    pub size_ratio: f64,
    /// Display size mapped onto `[min_size, min_size + max_span]`
    pub size: f64,
}

/// Partition non-completed tasks into space buckets and derive
/// proportional display sizes.
///
/// Tasks without a space, or referencing a name with no matching space
/// record, fall into a synthetic [`UNASSIGNED_SPACE`] bucket appended after
/// the real spaces. Empty buckets are dropped. Output is ordered by
/// descending task count; the sort is stable, so ties keep space-list
/// order with Unassigned last.
pub fn compute_metrics(tasks: &[Task], spaces: &[Space], layout: &LayoutConfig) -> Vec<SpaceMetric> {
    struct Bucket<'a> {
        name: &'a str,
        count: usize,
        minutes: u64,
    }

    let mut buckets: Vec<Bucket> = spaces
        .iter()
        .map(|space| Bucket {
            name: space.name.as_str(),
            count: 0,
            minutes: 0,
        })
        .collect();
    let mut unassigned = Bucket {
        name: UNASSIGNED_SPACE,
        count: 0,
        minutes: 0,
    };

    for task in tasks.iter().filter(|task| !task.completed) {
        let position = task
            .space
            .as_deref()
            .and_then(|name| buckets.iter().position(|bucket| bucket.name == name));
        let bucket = match position {
            Some(idx) => &mut buckets[idx],
            None => &mut unassigned,
        };
        bucket.count += 1;
        bucket.minutes += u64::from(task.duration_minutes());
    }

    buckets.push(unassigned);

    let total_count: usize = buckets.iter().map(|bucket| bucket.count).sum();
    let total_minutes: u64 = buckets.iter().map(|bucket| bucket.minutes).sum();

    let mut metrics: Vec<SpaceMetric> = buckets
        .into_iter()
        .filter(|bucket| bucket.count > 0)
        .map(|bucket| {
            let count_ratio = if total_count > 0 {
                bucket.count as f64 / total_count as f64
            } else {
                0.0
            };
            let time_ratio = if total_minutes > 0 {
                bucket.minutes as f64 / total_minutes as f64
            } else {
                0.0
            };
            let size_ratio = COUNT_WEIGHT * count_ratio + TIME_WEIGHT * time_ratio;

            SpaceMetric {
                name: bucket.name.to_string(),
                task_count: bucket.count,
                total_minutes: bucket.minutes,
                total_hours: round1(bucket.minutes as f64 / 60.0),
                size_ratio,
                size: layout.min_size + layout.max_span * size_ratio,
            }
        })
        .collect();

    metrics.sort_by(|left, right| right.task_count.cmp(&left.task_count));
    metrics
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
