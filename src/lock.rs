//! Advisory locking and atomic replacement for collection files.
//!
//! Several tempo processes may share one data directory. Writers take an
//! exclusive flock on a `.lock` sidecar next to the collection, then replace
//! the collection file with a temp-write-and-rename so readers never observe
//! a partial document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// How long writers wait on a contended sidecar before giving up
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Exclusive advisory lock on a sidecar file, released on drop
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Take the lock, waiting up to `timeout_ms` for another holder.
    ///
    /// The sidecar and its parent directory are created when missing.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let file = open_sidecar(path)?;

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(FileLock { file }),
                Err(err) if is_contention(&err) => {
                    if Instant::now() >= deadline {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(err) => return Err(Error::Io(err)),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The OS also releases the lock when the descriptor closes.
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_sidecar(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

fn is_contention(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    // Windows surfaces lock and sharing violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// Replace `path` with `data` atomically.
///
/// The bytes land in a process-tagged temp file in the same directory and
/// are renamed over the target, so a concurrent reader sees the old document
/// or the new one, never a torn mix. Coordination between writers is the
/// caller's concern; pair with [`FileLock`] on the sidecar.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(format!(".tmp.{}", std::process::id()));
    let temp_path = PathBuf::from(temp_name);

    let mut temp = File::create(&temp_path)?;
    temp.write_all(data)?;
    temp.sync_all()?;
    drop(temp);

    fs::rename(&temp_path, path)?;
    Ok(())
}
