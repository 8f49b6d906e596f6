//! tempo agenda command implementation.
//!
//! Projects scheduled tasks and enabled feed events into one window and
//! lists them chronologically.

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::calendar::{CalendarEvent, EventClass};
use crate::cli::context::{load_context, local_now, parse_date};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct AgendaOptions {
    pub from: Option<String>,
    pub days: Option<u32>,
    pub all: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub async fn run(options: AgendaOptions) -> Result<()> {
    let from = match options.from.as_deref() {
        Some(value) => parse_date("from", value)?,
        None => local_now().date(),
    };

    let mut ctx = load_context(options.data_dir)?;
    let days = options
        .days
        .unwrap_or(ctx.backend.config().feeds.window_days);
    let window_start = from.and_time(NaiveTime::MIN);
    let window_end = window_start + Duration::days(i64::from(days));

    if options.all {
        ctx.store.reload(true).await?;
    }
    ctx.store.refresh_calendar(window_start, window_end).await?;

    // The projection carries every scheduled task; the window only bounds
    // what this listing shows.
    let mut events: Vec<CalendarEvent> = ctx
        .store
        .calendar_events()
        .iter()
        .filter(|event| event.start < window_end && event.end > window_start)
        .cloned()
        .collect();
    events.sort_by(|left, right| {
        left.start
            .cmp(&right.start)
            .then_with(|| left.end.cmp(&right.end))
    });

    let output = AgendaOutput {
        from: window_start,
        to: window_end,
        total: events.len(),
        events: events.clone(),
    };

    let mut human = HumanOutput::new("Agenda");
    human.push_summary("from", window_start.format("%Y-%m-%d").to_string());
    human.push_summary("days", days.to_string());
    human.push_summary("events", events.len().to_string());
    for event in &events {
        let marker = match event.class {
            EventClass::Completed => " (done)",
            EventClass::External => " (feed)",
            _ => "",
        };
        human.push_detail(format!(
            "{} -> {} {}{}",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%H:%M"),
            event.title,
            marker
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "agenda",
        &output,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct AgendaOutput {
    from: NaiveDateTime,
    to: NaiveDateTime,
    total: usize,
    events: Vec<CalendarEvent>,
}
