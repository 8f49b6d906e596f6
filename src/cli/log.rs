//! tempo log command implementation.
//!
//! Shows the task change log, newest entries first.

use std::path::PathBuf;

use crate::changelog::{ChangeAction, ChangeEntry, DEFAULT_LOG_LIMIT};
use crate::cli::context::load_context;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct LogOptions {
    pub limit: Option<usize>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub async fn run(options: LogOptions) -> Result<()> {
    let limit = options.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let ctx = load_context(options.data_dir)?;
    let entries = ctx.backend.recent_changes(limit)?;

    let output = LogOutput {
        total: entries.len(),
        entries: entries.clone(),
    };

    let mut human = HumanOutput::new("Recent changes");
    human.push_summary("entries", entries.len().to_string());
    for entry in &entries {
        human.push_detail(format_entry(entry));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "log",
        &output,
        Some(&human),
    )
}

fn format_entry(entry: &ChangeEntry) -> String {
    let mut line = format!(
        "{} {} {} {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        action_label(entry.action),
        entry.entity_type,
        entry.entity_id
    );
    let title = entry
        .new_value
        .as_ref()
        .or(entry.old_value.as_ref())
        .and_then(|value| value.get("title"))
        .and_then(|title| title.as_str());
    if let Some(title) = title {
        line.push_str(&format!(" \"{title}\""));
    }
    line
}

fn action_label(action: ChangeAction) -> &'static str {
    match action {
        ChangeAction::Create => "create",
        ChangeAction::Update => "update",
        ChangeAction::Delete => "delete",
        ChangeAction::Freeze => "freeze",
        ChangeAction::Unfreeze => "unfreeze",
        ChangeAction::Reorder => "reorder",
    }
}

#[derive(serde::Serialize)]
struct LogOutput {
    total: usize,
    entries: Vec<ChangeEntry>,
}
