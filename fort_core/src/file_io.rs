//! # File I/O Module
//!
//! Persists the [`PlanStore`] as one JSON document:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the store file
//! - **File locking**: one writer per store file at a time
//! - **Version validation**: refuse files from an incompatible schema
//!
//! ## File Format
//!
//! ```json
//! {
//!   "meta": { "version": "0.1.0", "created": "...", "modified": "..." },
//!   "realms": {
//!     "westmarch": {
//!       "aldric": { "current": "Keep", "plans": { "Keep": { ... } } }
//!     }
//!   }
//! }
//! ```
//!
//! Lock files sit next to the store with a `.lock` suffix
//! (`fortifications.json.lock`) and record who holds them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fort_core::file_io::{load_store, save_store, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("fortifications.json");
//!
//! let lock = FileLock::acquire(path, "aldric")?;
//! let mut store = load_store(path)?;
//! store.touch();
//! save_store(&store, path)?;
//! drop(lock);
//! # Ok::<(), fort_core::errors::FortError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{FortError, FortResult};
use crate::store::{PlanStore, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of owner
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who acquired the lock
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a store file, released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lock` file, and writes
/// [`LockInfo`] into it so other users can see who has the store.
pub struct FileLock {
    store_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// Fails with [`FortError::FileLocked`] if a live process holds it.
    /// Stale locks (dead process on this machine, or older than a day)
    /// are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> FortResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(FortError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(
                    lock = %lock_path.display(),
                    holder = %existing.user_id,
                    pid = existing.pid,
                    "taking over stale lock"
                );
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| FortError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            FortError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| FortError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| FortError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(lock = %lock_path.display(), user = %info.user_id, "lock acquired");
        Ok(FileLock {
            store_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone (stale locks count as free)
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path)
            .ok()
            .filter(|info| !is_lock_stale(info))
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        debug!(lock = %self.lock_path.display(), "lock released");
    }
}

/// `fortifications.json` → `fortifications.json.lock`
fn lock_path_for(store_path: &Path) -> PathBuf {
    sibling_with_suffix(store_path, "lock")
}

fn tmp_path_for(store_path: &Path) -> PathBuf {
    sibling_with_suffix(store_path, "tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let extension = sibling
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_extension(extension);
    sibling
}

fn read_lock_info(lock_path: &Path) -> FortResult<LockInfo> {
    let mut contents = String::new();
    File::open(lock_path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|e| FortError::file_error("read lock", lock_path.display().to_string(), e.to_string()))?;
    Ok(serde_json::from_str(&contents)?)
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine && !process_alive(info.pid) {
            return true;
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > STALE_LOCK_HOURS
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            !stdout.contains("No tasks") && stdout.contains(&pid.to_string())
        }
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Save the store with atomic write semantics.
///
/// The JSON goes to a `.tmp` sibling, is synced, then renamed over `path`,
/// so an interrupted save never leaves a truncated store behind.
pub fn save_store(store: &PlanStore, path: &Path) -> FortResult<()> {
    let json = serde_json::to_string_pretty(store)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| FortError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| FortError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| FortError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FortError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "store saved");
    Ok(())
}

/// Load the store from `path`.
///
/// A missing file is an empty store, not an error. Selection pointers
/// that name missing plans are repaired on the way in.
///
/// # Errors
///
/// * [`FortError::VersionMismatch`] - file version is incompatible
/// * [`FortError::SerializationError`] - invalid JSON
/// * [`FortError::FileError`] - I/O error
pub fn load_store(path: &Path) -> FortResult<PlanStore> {
    let mut contents = String::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut contents)
                .map_err(|e| FortError::file_error("read", path.display().to_string(), e.to_string()))?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no store file yet, starting empty");
            return Ok(PlanStore::new());
        }
        Err(e) => {
            return Err(FortError::file_error("open", path.display().to_string(), e.to_string()));
        }
    }

    let mut store: PlanStore = serde_json::from_str(&contents)
        .map_err(|e| FortError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&store.meta.version)?;
    store.repair_selections();

    debug!(path = %path.display(), realms = store.realms.len(), "store loaded");
    Ok(store)
}

/// Load the store along with whoever currently holds its lock.
pub fn load_store_with_lock_check(path: &Path) -> FortResult<(PlanStore, Option<LockInfo>)> {
    let store = load_store(path)?;
    let lock_info = FileLock::check(path);
    Ok((store, lock_info))
}

/// Major versions must match; on 0.x a newer minor is also rejected.
fn validate_version(file_version: &str) -> FortResult<()> {
    let mismatch = || FortError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}
