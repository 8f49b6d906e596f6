//! Command-line interface for tempo
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use clap::{Parser, Subcommand};

use crate::error::Result;

mod agenda;
mod context;
mod feed;
mod init;
mod log;
mod overview;
mod plan;
mod space;
mod task;

/// tempo - Schedule reconciliation for personal tasks
///
/// A CLI planner that reconciles tasks, spaces, and external event feeds
/// into one agenda, with freezing, urgency ranking, and an auto-scheduler
/// for everything not pinned down.
#[derive(Parser, Debug)]
#[command(name = "tempo")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "TEMPO_DATA_DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory with default config and spaces
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Space management
    #[command(subcommand)]
    Space(SpaceCommands),

    /// External event feed management
    #[command(subcommand)]
    Feed(FeedCommands),

    /// Combined calendar of scheduled tasks and feed events
    Agenda {
        /// Window start date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Window length in days (defaults to feeds.window_days)
        #[arg(long)]
        days: Option<u32>,

        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },

    /// Auto-schedule unfrozen tasks into free slots
    Plan {
        /// Schedule from this time, YYYY-MM-DDTHH:MM (defaults to now)
        #[arg(long)]
        from: Option<String>,

        /// Compute assignments without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Recent task changes, newest first
    Log {
        /// Maximum entries to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Headline stats and proportional space sizes
    Overview,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Space to file the task under (name, id, or id prefix)
        #[arg(long)]
        space: Option<String>,

        /// Priority 1-10; out-of-range values are clamped
        #[arg(long)]
        priority: Option<i32>,

        /// Estimated duration in minutes
        #[arg(long)]
        duration: Option<u32>,

        /// Deadline, YYYY-MM-DDTHH:MM
        #[arg(long)]
        deadline: Option<String>,

        /// Scheduled start, YYYY-MM-DDTHH:MM (requires --end)
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Scheduled end, YYYY-MM-DDTHH:MM (requires --start)
        #[arg(long, requires = "start")]
        end: Option<String>,
    },

    /// List tasks in display order
    Ls {
        /// Include completed tasks
        #[arg(long)]
        all: bool,

        /// Only tasks in this space (name, id, or id prefix)
        #[arg(long)]
        space: Option<String>,
    },

    /// List open tasks by urgency, most urgent first
    Rank {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },

    /// Edit task fields
    Edit {
        /// Task id or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,

        /// New space (name, id, or id prefix)
        #[arg(long)]
        space: Option<String>,

        /// Detach the task from its space
        #[arg(long, conflicts_with = "space")]
        clear_space: bool,

        /// New priority 1-10; out-of-range values are clamped
        #[arg(long)]
        priority: Option<i32>,

        /// New estimated duration in minutes
        #[arg(long)]
        duration: Option<u32>,

        /// Remove the estimated duration
        #[arg(long, conflicts_with = "duration")]
        clear_duration: bool,

        /// New deadline, YYYY-MM-DDTHH:MM
        #[arg(long)]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long, conflicts_with = "deadline")]
        clear_deadline: bool,

        /// New scheduled start, YYYY-MM-DDTHH:MM
        #[arg(long)]
        start: Option<String>,

        /// New scheduled end, YYYY-MM-DDTHH:MM
        #[arg(long)]
        end: Option<String>,

        /// Remove the schedule entirely
        #[arg(long, conflicts_with_all = ["start", "end"])]
        clear_schedule: bool,
    },

    /// Mark a task completed
    Done {
        /// Task id or unique prefix
        id: String,
    },

    /// Reopen a completed task
    Reopen {
        /// Task id or unique prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique prefix
        id: String,
    },

    /// Move a task to a new slot; freezes it unless --no-freeze
    Move {
        /// Task id or unique prefix
        id: String,

        /// New start, YYYY-MM-DDTHH:MM
        #[arg(long)]
        start: String,

        /// New end, YYYY-MM-DDTHH:MM
        #[arg(long)]
        end: String,

        /// Leave the frozen flag as it was
        #[arg(long)]
        no_freeze: bool,
    },

    /// Change a scheduled task's end; freezes it unless --no-freeze
    Resize {
        /// Task id or unique prefix
        id: String,

        /// New end, YYYY-MM-DDTHH:MM
        #[arg(long)]
        end: String,

        /// Leave the frozen flag as it was
        #[arg(long)]
        no_freeze: bool,
    },

    /// Toggle a task's frozen flag
    Freeze {
        /// Task id or unique prefix
        id: String,
    },

    /// Freeze every task scheduled on a date, or thaw them if all are
    /// already frozen
    FreezeDay {
        /// Date, YYYY-MM-DD
        date: String,
    },

    /// Reassign display order from id positions
    Reorder {
        /// Task ids in the desired order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Space subcommands
#[derive(Subcommand, Debug)]
pub enum SpaceCommands {
    /// Create a space
    Add {
        /// Space name (unique, case-insensitive)
        name: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Weekly availability window, e.g. mon:09:00-17:00 (repeatable)
        #[arg(long)]
        window: Vec<String>,
    },

    /// List spaces
    Ls,

    /// Edit a space
    Edit {
        /// Space name, id, or unique id prefix
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,

        /// Replace availability windows, e.g. mon:09:00-17:00 (repeatable)
        #[arg(long)]
        window: Vec<String>,

        /// Remove all availability windows
        #[arg(long, conflicts_with = "window")]
        clear_windows: bool,
    },

    /// Delete a space; its tasks keep the dangling name
    Rm {
        /// Space name, id, or unique id prefix
        id: String,
    },
}

/// Feed subcommands
#[derive(Subcommand, Debug)]
pub enum FeedCommands {
    /// Register a local JSON event feed
    Add {
        /// Feed name
        name: String,

        /// Path to the feed file
        path: std::path::PathBuf,
    },

    /// List feeds
    Ls,

    /// Enable or disable a feed
    Toggle {
        /// Feed id or unique prefix
        id: String,
    },

    /// Remove a feed
    Rm {
        /// Feed id or unique prefix
        id: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(self.data_dir, self.json, self.quiet),
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    description,
                    space,
                    priority,
                    duration,
                    deadline,
                    start,
                    end,
                } => {
                    task::run_add(task::AddOptions {
                        title,
                        description,
                        space,
                        priority,
                        duration,
                        deadline,
                        start,
                        end,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Ls { all, space } => {
                    task::run_ls(task::LsOptions {
                        all,
                        space,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Rank { all } => {
                    task::run_rank(task::RankOptions {
                        all,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    clear_description,
                    space,
                    clear_space,
                    priority,
                    duration,
                    clear_duration,
                    deadline,
                    clear_deadline,
                    start,
                    end,
                    clear_schedule,
                } => {
                    task::run_edit(task::EditOptions {
                        id,
                        title,
                        description,
                        clear_description,
                        space,
                        clear_space,
                        priority,
                        duration,
                        clear_duration,
                        deadline,
                        clear_deadline,
                        start,
                        end,
                        clear_schedule,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Done { id } => {
                    task::run_done(task::DoneOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Reopen { id } => {
                    task::run_reopen(task::ReopenOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Rm { id } => {
                    task::run_rm(task::RmOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Move {
                    id,
                    start,
                    end,
                    no_freeze,
                } => {
                    task::run_move(task::MoveOptions {
                        id,
                        start,
                        end,
                        no_freeze,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Resize { id, end, no_freeze } => {
                    task::run_resize(task::ResizeOptions {
                        id,
                        end,
                        no_freeze,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Freeze { id } => {
                    task::run_freeze(task::FreezeOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::FreezeDay { date } => {
                    task::run_freeze_day(task::FreezeDayOptions {
                        date,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Reorder { ids } => {
                    task::run_reorder(task::ReorderOptions {
                        ids,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Space(cmd) => match cmd {
                SpaceCommands::Add {
                    name,
                    description,
                    window,
                } => {
                    space::run_add(space::AddOptions {
                        name,
                        description,
                        window,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                SpaceCommands::Ls => {
                    space::run_ls(space::LsOptions {
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                SpaceCommands::Edit {
                    id,
                    name,
                    description,
                    clear_description,
                    window,
                    clear_windows,
                } => {
                    space::run_edit(space::EditOptions {
                        id,
                        name,
                        description,
                        clear_description,
                        window,
                        clear_windows,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                SpaceCommands::Rm { id } => {
                    space::run_rm(space::RmOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Feed(cmd) => match cmd {
                FeedCommands::Add { name, path } => {
                    feed::run_add(feed::AddOptions {
                        name,
                        path,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                FeedCommands::Ls => {
                    feed::run_ls(feed::LsOptions {
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                FeedCommands::Toggle { id } => {
                    feed::run_toggle(feed::ToggleOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                FeedCommands::Rm { id } => {
                    feed::run_rm(feed::RmOptions {
                        id,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Agenda { from, days, all } => {
                agenda::run(agenda::AgendaOptions {
                    from,
                    days,
                    all,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Plan { from, dry_run } => {
                plan::run(plan::PlanOptions {
                    from,
                    dry_run,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Log { limit } => {
                log::run(log::LogOptions {
                    limit,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Overview => {
                overview::run(overview::OverviewOptions {
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
        }
    }
}
