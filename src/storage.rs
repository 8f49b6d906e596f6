//! Storage layer for tempo
//!
//! Manages persistent state in a single data directory:
//!
//! ```text
//! <data-dir>/
//!   config.toml        # User configuration
//!   tasks.json         # Task collection
//!   spaces.json        # Space collection
//!   feeds.json         # External feed registry
//!   changelog.jsonl    # Append-only mutation log
//! ```
//!
//! Collections are whole-file JSON arrays rewritten atomically on every
//! mutation. Writers hold an exclusive lock on a `.lock` sidecar so several
//! tempo processes can share one data directory.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::changelog::ChangeEntry;
use crate::error::{Error, Result};
use crate::feed::FeedSource;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::space::Space;
use crate::task::Task;

/// Handle to the tempo data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_root: PathBuf,
}

impl Storage {
    /// Create a storage handle for an explicit data directory
    pub fn new(data_root: PathBuf) -> Self {
        Self { data_root }
    }

    /// Resolve the data directory: explicit flag/env value if given,
    /// otherwise the platform data directory
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        match data_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => {
                let dirs = directories::ProjectDirs::from("", "", "tempo").ok_or_else(|| {
                    Error::OperationFailed("could not determine a data directory".to_string())
                })?;
                Ok(Self::new(dirs.data_dir().to_path_buf()))
            }
        }
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Root of the data directory
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Path to `config.toml`
    pub fn config_file(&self) -> PathBuf {
        self.data_root.join("config.toml")
    }

    /// Path to the task collection
    pub fn tasks_file(&self) -> PathBuf {
        self.data_root.join("tasks.json")
    }

    /// Path to the space collection
    pub fn spaces_file(&self) -> PathBuf {
        self.data_root.join("spaces.json")
    }

    /// Path to the feed registry
    pub fn feeds_file(&self) -> PathBuf {
        self.data_root.join("feeds.json")
    }

    /// Path to the append-only change log
    pub fn changelog_file(&self) -> PathBuf {
        self.data_root.join("changelog.jsonl")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory and empty collections
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_root)?;
        for path in [self.tasks_file(), self.spaces_file(), self.feeds_file()] {
            if !path.exists() {
                self.write_atomic(&path, b"[]")?;
            }
        }
        Ok(())
    }

    /// Whether the data directory has been initialized
    pub fn is_initialized(&self) -> bool {
        self.tasks_file().exists()
    }

    /// Error unless the data directory has been initialized
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized(self.data_root.clone()));
        }
        Ok(())
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    ///
    /// This ensures that concurrent readers never see partial writes.
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Write data atomically using temp file + rename
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        lock::write_atomic(path, data)
    }

    /// Append a line to a JSONL file
    ///
    /// Note: This is NOT atomic. Callers coordinating with other processes
    /// hold a lock on the sidecar first.
    pub fn append_jsonl<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(record)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        writeln!(file, "{}", json)?;
        file.sync_all()?;

        Ok(())
    }

    /// Read all records from a JSONL file
    pub fn read_jsonl<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line)?;
            records.push(record);
        }

        Ok(records)
    }

    // =========================================================================
    // Collection operations (locked read-modify-write)
    // =========================================================================

    /// Read the task collection without locking
    pub fn read_tasks(&self) -> Result<Vec<Task>> {
        self.read_collection(&self.tasks_file())
    }

    /// Mutate the task collection under an exclusive lock
    pub fn update_tasks<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<T>,
    {
        self.update_collection(&self.tasks_file(), f)
    }

    /// Read the space collection without locking
    pub fn read_spaces(&self) -> Result<Vec<Space>> {
        self.read_collection(&self.spaces_file())
    }

    /// Mutate the space collection under an exclusive lock
    pub fn update_spaces<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Space>) -> Result<T>,
    {
        self.update_collection(&self.spaces_file(), f)
    }

    /// Read the feed registry without locking
    pub fn read_feeds(&self) -> Result<Vec<FeedSource>> {
        self.read_collection(&self.feeds_file())
    }

    /// Mutate the feed registry under an exclusive lock
    pub fn update_feeds<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<FeedSource>) -> Result<T>,
    {
        self.update_collection(&self.feeds_file(), f)
    }

    fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.read_json(path)
    }

    fn update_collection<T, R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_path = sidecar_lock_path(path);
        let _lock = FileLock::acquire(&lock_path, DEFAULT_LOCK_TIMEOUT_MS)?;

        let mut items: Vec<T> = if path.exists() {
            self.read_json(path)?
        } else {
            Vec::new()
        };

        let result = f(&mut items)?;

        let json = serde_json::to_string_pretty(&items)?;
        lock::write_atomic(path, json.as_bytes())?;

        Ok(result)
    }

    // =========================================================================
    // Change log
    // =========================================================================

    /// Append one entry to the change log under an exclusive lock
    pub fn append_change(&self, entry: &ChangeEntry) -> Result<()> {
        let path = self.changelog_file();
        let lock_path = sidecar_lock_path(&path);
        let _lock = FileLock::acquire(&lock_path, DEFAULT_LOCK_TIMEOUT_MS)?;
        self.append_jsonl(&path, entry)
    }

    /// Read the full change log in append order
    pub fn read_changes(&self) -> Result<Vec<ChangeEntry>> {
        self.read_jsonl(&self.changelog_file())
    }
}

fn sidecar_lock_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", path.display()))
}
