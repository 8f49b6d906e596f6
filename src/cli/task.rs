//! tempo task command implementations.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::cli::context::{load_context, local_now, parse_date, parse_datetime, Context};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::service::FreezeDayOutcome;
use crate::space;
use crate::task::{self, Task, TaskDraft, TaskPatch};
use crate::urgency;

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub space: Option<String>,
    pub priority: Option<i32>,
    pub duration: Option<u32>,
    pub deadline: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LsOptions {
    pub all: bool,
    pub space: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RankOptions {
    pub all: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub space: Option<String>,
    pub clear_space: bool,
    pub priority: Option<i32>,
    pub duration: Option<u32>,
    pub clear_duration: bool,
    pub deadline: Option<String>,
    pub clear_deadline: bool,
    pub start: Option<String>,
    pub end: Option<String>,
    pub clear_schedule: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DoneOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ReopenOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct MoveOptions {
    pub id: String,
    pub start: String,
    pub end: String,
    pub no_freeze: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ResizeOptions {
    pub id: String,
    pub end: String,
    pub no_freeze: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct FreezeOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct FreezeDayOptions {
    pub date: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ReorderOptions {
    pub ids: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub async fn run_add(options: AddOptions) -> Result<()> {
    let deadline = parse_optional_datetime("deadline", options.deadline.as_deref())?;
    let start = parse_optional_datetime("start", options.start.as_deref())?;
    let end = parse_optional_datetime("end", options.end.as_deref())?;

    let mut ctx = load_context(options.data_dir)?;

    let space_name = match options.space.as_deref() {
        Some(reference) => Some(resolve_space_name(&mut ctx, reference).await?),
        None => None,
    };

    let mut draft = TaskDraft::new(options.title);
    if let Some(description) = options.description {
        draft = draft.description(description);
    }
    if let Some(name) = space_name {
        draft = draft.space(name);
    }
    if let Some(priority) = options.priority {
        draft = draft.priority(priority);
    }
    if let Some(minutes) = options.duration {
        draft = draft.duration(minutes);
    }
    if let Some(deadline) = deadline {
        draft = draft.deadline(deadline);
    }
    if let (Some(start), Some(end)) = (start, end) {
        draft = draft.schedule(start, end);
    }

    let created = ctx.store.create_task(draft).await?;

    let output = TaskCreatedOutput {
        id: created.id.clone(),
        title: created.title.clone(),
        priority: created.priority,
        space: created.space.clone(),
    };

    let mut human = HumanOutput::new("Task created");
    human.push_summary("id", created.id.clone());
    human.push_summary("title", created.title.clone());
    human.push_summary("priority", created.priority.to_string());
    if let Some(space) = created.space.as_ref() {
        human.push_summary("space", space.clone());
    }
    if let Some(deadline) = created.deadline {
        human.push_summary("deadline", format_datetime(deadline));
    }
    if created.is_scheduled() {
        human.push_summary("scheduled", format_slot(&created));
    }
    human.push_next_step("tempo task ls");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &output,
        Some(&human),
    )
}

pub async fn run_ls(options: LsOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;

    let space_filter = match options.space.as_deref() {
        Some(reference) => Some(resolve_space_name(&mut ctx, reference).await?),
        None => None,
    };

    ctx.store.reload(options.all).await?;
    let mut tasks = ctx.store.tasks().to_vec();
    if let Some(name) = space_filter.as_ref() {
        tasks.retain(|task| task.space.as_deref() == Some(name.as_str()));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.clone(),
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("total", tasks.len().to_string());
    if let Some(name) = space_filter {
        human.push_summary("space", name);
    }
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task ls",
        &output,
        Some(&human),
    )
}

pub async fn run_rank(options: RankOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(options.all).await?;

    let now = local_now();
    let ranked = urgency::rank(ctx.store.tasks(), now);
    let entries: Vec<RankedTask> = ranked
        .iter()
        .map(|task| RankedTask {
            score: urgency::urgency_score(task, now),
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            deadline: task.deadline,
        })
        .collect();

    let output = RankOutput {
        total: entries.len(),
        tasks: entries.clone(),
    };

    let mut human = HumanOutput::new("Tasks by urgency");
    human.push_summary("total", entries.len().to_string());
    for entry in &entries {
        let mut line = format!("[{}] [p{}] {} {}", entry.score, entry.priority, entry.id, entry.title);
        if let Some(deadline) = entry.deadline {
            line.push_str(&format!(" (due: {})", format_datetime(deadline)));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task rank",
        &output,
        Some(&human),
    )
}

pub async fn run_edit(options: EditOptions) -> Result<()> {
    let deadline = parse_optional_datetime("deadline", options.deadline.as_deref())?;
    let start = parse_optional_datetime("start", options.start.as_deref())?;
    let end = parse_optional_datetime("end", options.end.as_deref())?;

    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &options.id)?;

    let space_name = match options.space.as_deref() {
        Some(reference) => Some(resolve_space_name(&mut ctx, reference).await?),
        None => None,
    };

    let mut patch = TaskPatch::default();
    let mut changed: Vec<&str> = Vec::new();

    if let Some(title) = options.title {
        patch.title = Some(title);
        changed.push("title");
    }
    if let Some(description) = options.description {
        patch.description = Some(Some(description));
        changed.push("description");
    } else if options.clear_description {
        patch.description = Some(None);
        changed.push("description");
    }
    if let Some(name) = space_name {
        patch.space = Some(Some(name));
        changed.push("space");
    } else if options.clear_space {
        patch.space = Some(None);
        changed.push("space");
    }
    if let Some(priority) = options.priority {
        patch.priority = Some(priority);
        changed.push("priority");
    }
    if let Some(minutes) = options.duration {
        patch.estimated_duration = Some(Some(minutes));
        changed.push("duration");
    } else if options.clear_duration {
        patch.estimated_duration = Some(None);
        changed.push("duration");
    }
    if let Some(deadline) = deadline {
        patch.deadline = Some(Some(deadline));
        changed.push("deadline");
    } else if options.clear_deadline {
        patch.deadline = Some(None);
        changed.push("deadline");
    }
    if let Some(start) = start {
        patch.scheduled_start = Some(Some(start));
        changed.push("start");
    }
    if let Some(end) = end {
        patch.scheduled_end = Some(Some(end));
        changed.push("end");
    }
    if options.clear_schedule {
        patch.scheduled_start = Some(None);
        patch.scheduled_end = Some(None);
        changed.push("schedule");
    }

    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "no changes requested; pass at least one field flag".to_string(),
        ));
    }

    let updated = ctx.store.update_task(&id, patch).await?;

    let output = TaskEditOutput {
        id: updated.id.clone(),
        title: updated.title.clone(),
        changed: changed.iter().map(|field| field.to_string()).collect(),
    };

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("id", updated.id.clone());
    human.push_summary("title", updated.title.clone());
    human.push_summary("changed", changed.join(", "));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &output,
        Some(&human),
    )
}

pub async fn run_done(options: DoneOptions) -> Result<()> {
    set_completed(
        options.id,
        true,
        options.data_dir,
        options.json,
        options.quiet,
        "task done",
        "Task completed",
    )
    .await
}

pub async fn run_reopen(options: ReopenOptions) -> Result<()> {
    set_completed(
        options.id,
        false,
        options.data_dir,
        options.json,
        options.quiet,
        "task reopen",
        "Task reopened",
    )
    .await
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &options.id)?;

    let removed = ctx.store.delete_task(&id).await?;

    let output = TaskRemovedOutput {
        id: removed.id.clone(),
        title: removed.title.clone(),
    };

    let mut human = HumanOutput::new("Task removed");
    human.push_summary("id", removed.id);
    human.push_summary("title", removed.title);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task rm",
        &output,
        Some(&human),
    )
}

pub async fn run_move(options: MoveOptions) -> Result<()> {
    let start = parse_datetime("start", &options.start)?;
    let end = parse_datetime("end", &options.end)?;

    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &options.id)?;

    let moved = ctx
        .store
        .reschedule_task(&id, start, end, options.no_freeze)
        .await?;

    let output = TaskMovedOutput {
        id: moved.id.clone(),
        start,
        end,
        frozen: moved.frozen,
    };

    let mut human = HumanOutput::new("Task moved");
    human.push_summary("id", moved.id.clone());
    human.push_summary("slot", format_slot(&moved));
    human.push_summary("frozen", moved.frozen.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task move",
        &output,
        Some(&human),
    )
}

pub async fn run_resize(options: ResizeOptions) -> Result<()> {
    let end = parse_datetime("end", &options.end)?;

    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &options.id)?;

    let resized = ctx.store.resize_task(&id, end, options.no_freeze).await?;

    let output = TaskResizedOutput {
        id: resized.id.clone(),
        end,
        duration_minutes: resized.duration_minutes(),
        frozen: resized.frozen,
    };

    let mut human = HumanOutput::new("Task resized");
    human.push_summary("id", resized.id.clone());
    human.push_summary("slot", format_slot(&resized));
    human.push_summary(
        "duration",
        format!("{} minutes", resized.duration_minutes()),
    );
    human.push_summary("frozen", resized.frozen.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task resize",
        &output,
        Some(&human),
    )
}

pub async fn run_freeze(options: FreezeOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &options.id)?;

    let frozen = ctx.store.toggle_freeze(&id).await?;

    let output = TaskFrozenOutput {
        id: id.clone(),
        frozen,
    };

    let header = if frozen { "Task frozen" } else { "Task thawed" };
    let mut human = HumanOutput::new(header);
    human.push_summary("id", id);
    human.push_summary("frozen", frozen.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task freeze",
        &output,
        Some(&human),
    )
}

pub async fn run_freeze_day(options: FreezeDayOptions) -> Result<()> {
    let date = parse_date("date", &options.date)?;

    let mut ctx = load_context(options.data_dir)?;
    let outcome = ctx.store.freeze_day(date).await?;

    let output = FreezeDayCommandOutput { date, outcome };

    let header = match outcome.frozen {
        Some(true) => "Day frozen",
        Some(false) => "Day thawed",
        None => "Nothing scheduled that day",
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("date", date.to_string());
    human.push_summary("affected", outcome.affected.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task freeze-day",
        &output,
        Some(&human),
    )
}

pub async fn run_reorder(options: ReorderOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload(true).await?;

    let mut resolved: Vec<String> = Vec::with_capacity(options.ids.len());
    let mut unknown: Vec<String> = Vec::new();
    for raw in &options.ids {
        match task::resolve_task_id(ctx.store.tasks(), raw) {
            Ok(id) => resolved.push(id),
            // Unknown ids still take part so their positions stay reserved;
            // the backend skips them.
            Err(Error::TaskNotFound(_)) => {
                unknown.push(raw.clone());
                resolved.push(raw.trim().to_string());
            }
            Err(err) => return Err(err),
        }
    }

    let applied = ctx.store.reorder_tasks(&resolved).await?;

    let output = ReorderOutput {
        requested: resolved.len(),
        applied,
    };

    let mut human = HumanOutput::new("Tasks reordered");
    human.push_summary("requested", resolved.len().to_string());
    human.push_summary("applied", applied.to_string());
    for raw in &unknown {
        human.push_warning(format!("unknown task id '{raw}' skipped"));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task reorder",
        &output,
        Some(&human),
    )
}

async fn set_completed(
    id: String,
    completed: bool,
    data_dir: Option<PathBuf>,
    json: bool,
    quiet: bool,
    command: &str,
    header: &str,
) -> Result<()> {
    let mut ctx = load_context(data_dir)?;
    ctx.store.reload(true).await?;
    let id = task::resolve_task_id(ctx.store.tasks(), &id)?;

    let patch = TaskPatch {
        completed: Some(completed),
        ..TaskPatch::default()
    };
    let updated = ctx.store.update_task(&id, patch).await?;

    let output = TaskStatusOutput {
        id: updated.id.clone(),
        title: updated.title.clone(),
        completed: updated.completed,
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("id", updated.id);
    human.push_summary("title", updated.title);

    emit_success(OutputOptions { json, quiet }, command, &output, Some(&human))
}

/// Resolve a space reference (name, id, or prefix) to the space name,
/// which is what tasks store
async fn resolve_space_name(ctx: &mut Context, reference: &str) -> Result<String> {
    ctx.store.reload_spaces().await?;
    let id = space::resolve_space_id(ctx.store.spaces(), reference)?;
    match ctx.store.spaces().iter().find(|space| space.id == id) {
        Some(space) => Ok(space.name.clone()),
        None => Err(Error::SpaceNotFound(reference.to_string())),
    }
}

fn parse_optional_datetime(label: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    match value {
        Some(value) => Ok(Some(parse_datetime(label, value)?)),
        None => Ok(None),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn format_slot(task: &Task) -> String {
    match (task.scheduled_start, task.scheduled_end) {
        (Some(start), Some(end)) => {
            format!("{} -> {}", format_datetime(start), format_datetime(end))
        }
        _ => "unscheduled".to_string(),
    }
}

fn format_task_line(task: &Task) -> String {
    let mut line = format!("[p{}] {} {}", task.priority, task.id, task.title);
    if task.completed {
        line.push_str(" (done)");
    } else if task.frozen {
        line.push_str(" (frozen)");
    }
    if let Some(space) = task.space.as_ref() {
        line.push_str(&format!(" (space: {space})"));
    }
    if let Some(deadline) = task.deadline {
        line.push_str(&format!(" (due: {})", format_datetime(deadline)));
    }
    if task.is_scheduled() {
        line.push_str(&format!(" ({})", format_slot(task)));
    }
    line
}

#[derive(serde::Serialize)]
struct TaskCreatedOutput {
    id: String,
    title: String,
    priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    space: Option<String>,
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize, Clone)]
struct RankedTask {
    score: i64,
    id: String,
    title: String,
    priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<NaiveDateTime>,
}

#[derive(serde::Serialize)]
struct RankOutput {
    total: usize,
    tasks: Vec<RankedTask>,
}

#[derive(serde::Serialize)]
struct TaskEditOutput {
    id: String,
    title: String,
    changed: Vec<String>,
}

#[derive(serde::Serialize)]
struct TaskStatusOutput {
    id: String,
    title: String,
    completed: bool,
}

#[derive(serde::Serialize)]
struct TaskRemovedOutput {
    id: String,
    title: String,
}

#[derive(serde::Serialize)]
struct TaskMovedOutput {
    id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    frozen: bool,
}

#[derive(serde::Serialize)]
struct TaskResizedOutput {
    id: String,
    end: NaiveDateTime,
    duration_minutes: u32,
    frozen: bool,
}

#[derive(serde::Serialize)]
struct TaskFrozenOutput {
    id: String,
    frozen: bool,
}

#[derive(serde::Serialize)]
struct FreezeDayCommandOutput {
    date: chrono::NaiveDate,
    #[serde(flatten)]
    outcome: FreezeDayOutcome,
}

#[derive(serde::Serialize)]
struct ReorderOutput {
    requested: usize,
    applied: usize,
}
