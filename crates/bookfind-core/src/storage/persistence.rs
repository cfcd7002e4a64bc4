//! JSON collection persistence
//!
//! Saves and loads an ordered list of `BookRecord`s as a pretty-printed JSON
//! array. Uses atomic writes (write to temp file, then rename) so a crash
//! mid-save never leaves a half-written store behind.
//!
//! Storage location: `~/.local/share/bookfind/` (configurable via `Config`)
//!
//! Files:
//! - `favorites.json` - Saved favorites, insertion order
//! - `recent.json` - Recently viewed books, newest first

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::models::BookRecord;

/// Marker inserted into the name of a store file that could not be parsed
const CORRUPT_MARKER: &str = "corrupt";

/// How a load produced its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file on disk yet
    Missing,
    /// File parsed successfully
    Loaded,
    /// File existed but was unreadable; an empty collection was substituted
    Recovered {
        /// Where the unreadable file was moved, if the move succeeded
        backup_path: Option<PathBuf>,
        /// Parser message describing the corruption
        details: String,
    },
}

impl LoadOutcome {
    /// Whether the load had to discard a corrupt file
    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }
}

/// Records read from a store, plus how they were obtained
#[derive(Debug, Clone)]
pub struct Loaded {
    pub records: Vec<BookRecord>,
    pub outcome: LoadOutcome,
}

/// Persistence handler for one JSON collection file
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the backing file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the collection
    ///
    /// A missing file yields an empty collection. A file that is not a valid
    /// JSON array of records is moved aside to
    /// `<name>.corrupt.<YYYYMMDD_HHMMSS>.backup` and also yields an empty collection, reported as `LoadOutcome::Recovered`.
    /// Only genuine read failures (permissions, I/O) are errors.
    pub fn load(&self) -> StorageResult<Loaded> {
        if !self.path.exists() {
            debug!("No store at {:?}, starting empty", self.path);
            return Ok(Loaded {
                records: Vec::new(),
                outcome: LoadOutcome::Missing,
            });
        }

        let bytes =
            fs::read(&self.path).map_err(|e| StorageError::from_read(e, self.path.clone()))?;

        match serde_json::from_slice::<Vec<BookRecord>>(&bytes) {
            Ok(records) => {
                debug!("Loaded {} record(s) from {:?}", records.len(), self.path);
                Ok(Loaded {
                    records,
                    outcome: LoadOutcome::Loaded,
                })
            }
            Err(e) => {
                let details = e.to_string();
                let backup_path = self.set_aside_corrupt();
                warn!(
                    "Store {:?} is corrupted ({}); continuing with an empty collection",
                    self.path, details
                );
                Ok(Loaded {
                    records: Vec::new(),
                    outcome: LoadOutcome::Recovered {
                        backup_path,
                        details,
                    },
                })
            }
        }
    }

    /// Save the full collection, replacing the file atomically
    pub fn save(&self, records: &[BookRecord]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(records).map_err(|source| {
            StorageError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} record(s) to {:?}", records.len(), self.path);
        Ok(())
    }

    /// Move an unreadable store out of the way so it is not overwritten
    fn set_aside_corrupt(&self) -> Option<PathBuf> {
        let backup_path = backup_path_for(&self.path);
        match fs::rename(&self.path, &backup_path) {
            Ok(()) => Some(backup_path),
            Err(e) => {
                warn!(
                    "Could not back up corrupted store {:?} to {:?}: {}",
                    self.path, backup_path, e
                );
                None
            }
        }
    }
}

/// `favorites.json` -> `favorites.json.corrupt.20240101_120000.backup`
///
/// Earlier backups are never reused: a name already on disk gets a
/// `-1`, `-2`, ... counter.
fn backup_path_for(path: &Path) -> PathBuf {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let stem = format!("{}.{}.{}", base, CORRUPT_MARKER, timestamp);

    let mut candidate = path.with_file_name(format!("{}.backup", stem));
    let mut counter = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{}-{}.backup", stem, counter));
        counter += 1;
    }
    candidate
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        }
    })?;

    Ok(())
}
