//! tempo feed command implementations.

use std::path::PathBuf;

use crate::cli::context::load_context;
use crate::error::Result;
use crate::feed::{self, FeedSource};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct AddOptions {
    pub name: String,
    pub path: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ToggleOptions {
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

pub async fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let created = ctx.backend.add_feed(&options.name, options.path)?;

    let output = FeedOutput::from(&created);

    let mut human = HumanOutput::new("Feed registered");
    human.push_summary("id", created.id.clone());
    human.push_summary("name", created.name.clone());
    human.push_summary("path", created.path.display().to_string());
    human.push_next_step("tempo agenda");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "feed add",
        &output,
        Some(&human),
    )
}

pub async fn run_ls(options: LsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let feeds = ctx.backend.list_feeds()?;

    let output = FeedListOutput {
        total: feeds.len(),
        feeds: feeds.iter().map(FeedOutput::from).collect(),
    };

    let mut human = HumanOutput::new("Feeds");
    human.push_summary("total", feeds.len().to_string());
    for feed in &feeds {
        let state = if feed.enabled { "enabled" } else { "disabled" };
        human.push_detail(format!(
            "{} {} [{}] {}",
            feed.id,
            feed.name,
            state,
            feed.path.display()
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "feed ls",
        &output,
        Some(&human),
    )
}

pub async fn run_toggle(options: ToggleOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let feeds = ctx.backend.list_feeds()?;
    let id = feed::resolve_feed_id(&feeds, &options.id)?;

    let toggled = ctx.backend.toggle_feed(&id)?;

    let output = FeedOutput::from(&toggled);

    let header = if toggled.enabled {
        "Feed enabled"
    } else {
        "Feed disabled"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("id", toggled.id.clone());
    human.push_summary("name", toggled.name.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "feed toggle",
        &output,
        Some(&human),
    )
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let feeds = ctx.backend.list_feeds()?;
    let id = feed::resolve_feed_id(&feeds, &options.id)?;

    let removed = ctx.backend.remove_feed(&id)?;

    let output = FeedOutput::from(&removed);

    let mut human = HumanOutput::new("Feed removed");
    human.push_summary("id", removed.id);
    human.push_summary("name", removed.name);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "feed rm",
        &output,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct FeedOutput {
    id: String,
    name: String,
    path: PathBuf,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_fetched: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&FeedSource> for FeedOutput {
    fn from(feed: &FeedSource) -> Self {
        Self {
            id: feed.id.clone(),
            name: feed.name.clone(),
            path: feed.path.clone(),
            enabled: feed.enabled,
            last_fetched: feed.last_fetched,
        }
    }
}

#[derive(serde::Serialize)]
struct FeedListOutput {
    total: usize,
    feeds: Vec<FeedOutput>,
}
