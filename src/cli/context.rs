//! Shared wiring for command handlers: open the data directory, load
//! config, and connect the store to the local backend.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::local::LocalBackend;
use crate::storage::Storage;
use crate::store::TaskStore;

pub(crate) struct Context {
    pub(crate) backend: Arc<LocalBackend>,
    pub(crate) store: TaskStore,
}

/// Resolve the data directory and wire a store to the local backend.
/// Fails if `tempo init` has not been run there yet.
pub(crate) fn load_context(data_dir: Option<PathBuf>) -> Result<Context> {
    let storage = Storage::resolve(data_dir)?;
    storage.ensure_initialized()?;
    let config = Config::load_from_dir(storage.data_root())?;
    let backend = Arc::new(LocalBackend::new(storage, config));
    let store = TaskStore::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    );
    Ok(Context { backend, store })
}

/// Current wall-clock time, to the local timezone
pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a `YYYY-MM-DDTHH:MM` timestamp, with optional seconds
pub(crate) fn parse_datetime(label: &str, value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| {
            Error::InvalidArgument(format!(
                "invalid {label} '{trimmed}': expected YYYY-MM-DDTHH:MM"
            ))
        })
}

/// Parse a `YYYY-MM-DD` date
pub(crate) fn parse_date(label: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid {label} '{trimmed}': expected YYYY-MM-DD"
        ))
    })
}
