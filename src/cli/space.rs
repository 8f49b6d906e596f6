//! tempo space command implementations.

use std::path::PathBuf;

use crate::cli::context::{load_context, Context};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::service::SpaceService;
use crate::space::{self, Space, SpaceDraft, SpacePatch, TimeConstraint};

pub struct AddOptions {
    pub name: String,
    pub description: Option<String>,
    pub window: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub window: Vec<String>,
    pub clear_windows: bool,
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

pub async fn run_add(options: AddOptions) -> Result<()> {
    let windows = parse_windows(&options.window)?;
    let ctx = load_context(options.data_dir)?;

    let mut draft = SpaceDraft::new(options.name);
    if let Some(description) = options.description {
        draft = draft.description(description);
    }
    for constraint in &windows {
        draft = draft.window(*constraint);
    }

    let created = ctx.backend.create_space(draft).await?;

    let output = SpaceCreatedOutput {
        id: created.id.clone(),
        name: created.name.clone(),
        windows: created.time_constraints.len(),
    };

    let mut human = HumanOutput::new("Space created");
    human.push_summary("id", created.id.clone());
    human.push_summary("name", created.name.clone());
    if !created.time_constraints.is_empty() {
        human.push_summary("windows", format_windows(&created.time_constraints));
    }
    human.push_next_step(format!("tempo task add <title> --space {}", created.name));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "space add",
        &output,
        Some(&human),
    )
}

pub async fn run_ls(options: LsOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    ctx.store.reload_spaces().await?;
    let spaces = ctx.store.spaces().to_vec();

    let output = SpaceListOutput {
        total: spaces.len(),
        spaces: spaces.clone(),
    };

    let mut human = HumanOutput::new("Spaces");
    human.push_summary("total", spaces.len().to_string());
    for space in &spaces {
        let mut line = format!("{} {}", space.id, space.name);
        if !space.time_constraints.is_empty() {
            line.push_str(&format!(" ({})", format_windows(&space.time_constraints)));
        }
        if let Some(description) = space.description.as_ref() {
            line.push_str(&format!(" - {description}"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "space ls",
        &output,
        Some(&human),
    )
}

pub async fn run_edit(options: EditOptions) -> Result<()> {
    let windows = parse_windows(&options.window)?;
    let mut ctx = load_context(options.data_dir)?;
    let id = resolve(&mut ctx, &options.id).await?;

    let mut patch = SpacePatch {
        name: options.name,
        description: None,
        time_constraints: None,
    };
    if let Some(description) = options.description {
        patch.description = Some(Some(description));
    } else if options.clear_description {
        patch.description = Some(None);
    }
    if !windows.is_empty() {
        patch.time_constraints = Some(windows);
    } else if options.clear_windows {
        patch.time_constraints = Some(Vec::new());
    }

    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "no changes requested; pass at least one field flag".to_string(),
        ));
    }

    let updated = ctx.backend.update_space(&id, patch).await?;

    let output = SpaceEditOutput {
        id: updated.id.clone(),
        name: updated.name.clone(),
        windows: updated.time_constraints.len(),
    };

    let mut human = HumanOutput::new("Space updated");
    human.push_summary("id", updated.id.clone());
    human.push_summary("name", updated.name.clone());
    if !updated.time_constraints.is_empty() {
        human.push_summary("windows", format_windows(&updated.time_constraints));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "space edit",
        &output,
        Some(&human),
    )
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let id = resolve(&mut ctx, &options.id).await?;

    let removed = ctx.backend.delete_space(&id).await?;

    let output = SpaceRemovedOutput {
        id: removed.id.clone(),
        name: removed.name.clone(),
    };

    let mut human = HumanOutput::new("Space removed");
    human.push_summary("id", removed.id);
    human.push_summary("name", removed.name.clone());
    human.push_detail(format!(
        "tasks filed under '{}' keep the name until edited",
        removed.name
    ));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "space rm",
        &output,
        Some(&human),
    )
}

async fn resolve(ctx: &mut Context, reference: &str) -> Result<String> {
    ctx.store.reload_spaces().await?;
    space::resolve_space_id(ctx.store.spaces(), reference)
}

fn parse_windows(raw: &[String]) -> Result<Vec<TimeConstraint>> {
    raw.iter().map(|value| value.parse()).collect()
}

fn format_windows(constraints: &[TimeConstraint]) -> String {
    constraints
        .iter()
        .map(|constraint| constraint.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(serde::Serialize)]
struct SpaceCreatedOutput {
    id: String,
    name: String,
    windows: usize,
}

#[derive(serde::Serialize)]
struct SpaceListOutput {
    total: usize,
    spaces: Vec<Space>,
}

#[derive(serde::Serialize)]
struct SpaceEditOutput {
    id: String,
    name: String,
    windows: usize,
}

#[derive(serde::Serialize)]
struct SpaceRemovedOutput {
    id: String,
    name: String,
}
