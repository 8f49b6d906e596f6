//! tempo plan command implementation.
//!
//! Runs the auto-scheduler over unfrozen, incomplete tasks.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::cli::context::{load_context, local_now, parse_datetime};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::service::ScheduleOutcome;

pub struct PlanOptions {
    pub from: Option<String>,
    pub dry_run: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub async fn run(options: PlanOptions) -> Result<()> {
    let from = match options.from.as_deref() {
        Some(value) => parse_datetime("from", value)?,
        None => local_now(),
    };

    let mut ctx = load_context(options.data_dir)?;
    let outcome = ctx.store.run_scheduler(from, options.dry_run).await?;

    let output = PlanOutput { from, outcome };

    let header = if outcome.dry_run {
        "Plan (dry run)"
    } else {
        "Schedule updated"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("from", from.format("%Y-%m-%d %H:%M").to_string());
    human.push_summary("considered", outcome.considered.to_string());
    human.push_summary("scheduled", outcome.scheduled.to_string());
    let unplaced = outcome.considered.saturating_sub(outcome.scheduled);
    if unplaced > 0 {
        human.push_warning(format!(
            "could not place {unplaced} of {} tasks",
            outcome.considered
        ));
    }
    if outcome.dry_run {
        human.push_detail("no changes were saved");
    } else {
        human.push_next_step("tempo agenda");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "plan",
        &output,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct PlanOutput {
    from: NaiveDateTime,
    #[serde(flatten)]
    outcome: ScheduleOutcome,
}
