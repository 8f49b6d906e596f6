//! tempo overview command implementation.
//!
//! Headline counters plus proportional space sizes.

use std::path::PathBuf;

use crate::cli::context::{load_context, local_now};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::space::{self, SpaceMetric};
use crate::stats::OverviewStats;

pub struct OverviewOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub async fn run(options: OverviewOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(false).await?;
    ctx.store.reload_spaces().await?;

    let stats = OverviewStats::collect(ctx.store.tasks(), local_now());
    let spaces = space::compute_metrics(
        ctx.store.tasks(),
        ctx.store.spaces(),
        &ctx.backend.config().layout,
    );

    let output = OverviewOutput {
        stats: stats.clone(),
        spaces: spaces.clone(),
    };

    let mut human = HumanOutput::new("Overview");
    human.push_summary("open tasks", stats.total.to_string());
    human.push_summary("scheduled", stats.scheduled.to_string());
    human.push_summary("hours planned", format!("{:.1}", stats.hours_planned));
    human.push_summary("urgent", stats.urgent.to_string());
    for metric in &spaces {
        human.push_detail(format!(
            "{}: {} tasks, {:.1}h",
            metric.name, metric.task_count, metric.total_hours
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "overview",
        &output,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct OverviewOutput {
    stats: OverviewStats,
    spaces: Vec<SpaceMetric>,
}
