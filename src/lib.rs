//! tempo - Schedule Reconciliation Library
//!
//! This library provides the core functionality for the tempo CLI tool:
//! a personal planner that reconciles tasks, spaces, and external event
//! feeds into one coherent agenda.
//!
//! # Core Concepts
//!
//! - **Tasks**: Prioritized work items with optional deadlines and
//!   calendar slots
//! - **Spaces**: Named buckets with weekly availability windows that
//!   bound the auto-scheduler
//! - **Freezing**: Pinning tasks so the scheduler leaves them in place
//! - **Feeds**: Read-only external event sources merged into the agenda
//! - **Change Log**: Append-only audit trail of task mutations
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `task` / `space` / `feed`: Domain records and validation
//! - `store`: Cached view over the service seams, reloaded wholesale
//!   after every mutation
//! - `local`: File-backed service implementation, including the scheduler
//! - `calendar`: Projection of tasks and feed events into one view
//! - `urgency` / `stats`: Scoring and headline counters
//! - `storage`: File storage and directory management
//! - `lock`: File locking and atomic operations for concurrency safety

pub mod calendar;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod local;
pub mod lock;
pub mod output;
pub mod service;
pub mod space;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod urgency;

pub use error::{Error, Result};
