//! Favorites and recently viewed books
//!
//! `FavoritesManager` is the only owner of the two collections. Each
//! operation locks the in-memory state, computes the new collection on a
//! copy, persists it, and only then commits it, so memory never runs ahead
//! of what is on disk.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::BookRecord;
use crate::storage::{JsonStore, LoadOutcome, StorageResult};

/// Maximum number of recently viewed books kept
pub const RECENTS_CAPACITY: usize = 10;

/// A store that had to be recovered from corruption when opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// The store file that was unreadable
    pub path: PathBuf,
    /// Where the unreadable content was moved, if anywhere
    pub backup_path: Option<PathBuf>,
    /// Parser message
    pub details: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} was corrupted ({})", self.path.display(), self.details)?;
        match &self.backup_path {
            Some(backup) => write!(f, "; previous contents saved to {}", backup.display()),
            None => write!(f, "; previous contents could not be backed up"),
        }
    }
}

struct Collections {
    favorites: Vec<BookRecord>,
    recents: Vec<BookRecord>,
}

/// Business rules over the favorites and recents collections
pub struct FavoritesManager {
    favorites_store: JsonStore,
    recents_store: JsonStore,
    state: Mutex<Collections>,
    warnings: Vec<LoadWarning>,
}

impl FavoritesManager {
    /// Open both collections at the paths given by the configuration
    pub fn open(config: &Config) -> StorageResult<Self> {
        Self::open_at(config.favorites_path(), config.recents_path())
    }

    /// Open both collections at explicit paths
    pub fn open_at(
        favorites_path: impl Into<PathBuf>,
        recents_path: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let favorites_store = JsonStore::new(favorites_path);
        let recents_store = JsonStore::new(recents_path);

        let mut warnings = Vec::new();
        let favorites = load_collecting(&favorites_store, &mut warnings)?;
        let recents = load_collecting(&recents_store, &mut warnings)?;

        info!(
            "Opened favorites ({} saved, {} recent)",
            favorites.len(),
            recents.len()
        );

        Ok(Self {
            favorites_store,
            recents_store,
            state: Mutex::new(Collections { favorites, recents }),
            warnings,
        })
    }

    /// Stores that were corrupt when opened and have been reset
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Add a book to favorites with an optional note
    ///
    /// Returns `false` without touching disk if an identical record (same
    /// book fields and same note) is already saved. A blank note counts as
    /// no note.
    pub fn add_favorite(&self, book: &BookRecord, note: Option<String>) -> StorageResult<bool> {
        let note = note.filter(|n| !n.trim().is_empty());
        let candidate = book.clone().with_note(note);

        let mut state = self.lock();
        if state.favorites.contains(&candidate) {
            debug!("'{}' already in favorites", candidate.title);
            return Ok(false);
        }

        let mut updated = state.favorites.clone();
        updated.push(candidate);
        self.favorites_store.save(&updated)?;
        state.favorites = updated;

        info!("Added '{}' to favorites", book.title);
        Ok(true)
    }

    /// Record a book as recently viewed
    ///
    /// New books go to the front; a book already present stays where it is.
    /// The oldest entry is dropped once the list exceeds `RECENTS_CAPACITY`.
    pub fn add_recent(&self, book: &BookRecord) -> StorageResult<()> {
        let candidate = book.without_note();

        let mut state = self.lock();
        if state.recents.contains(&candidate) {
            return Ok(());
        }

        let mut updated = state.recents.clone();
        updated.insert(0, candidate);
        while updated.len() > RECENTS_CAPACITY {
            if let Some(evicted) = updated.pop() {
                debug!("Evicted '{}' from recents", evicted.title);
            }
        }
        self.recents_store.save(&updated)?;
        state.recents = updated;

        Ok(())
    }

    /// Remove every favorite with exactly this title
    ///
    /// Notes and other fields are ignored, so all variants of a title go.
    /// Returns how many entries were removed; zero is not an error.
    pub fn remove_favorite(&self, title: &str) -> StorageResult<usize> {
        let mut state = self.lock();

        let updated: Vec<BookRecord> = state
            .favorites
            .iter()
            .filter(|f| f.title != title)
            .cloned()
            .collect();
        let removed = state.favorites.len() - updated.len();

        self.favorites_store.save(&updated)?;
        state.favorites = updated;

        info!("Removed {} favorite(s) titled '{}'", removed, title);
        Ok(removed)
    }

    /// Empty the recently viewed list
    pub fn clear_recents(&self) -> StorageResult<()> {
        let mut state = self.lock();
        self.recents_store.save(&[])?;
        state.recents.clear();
        info!("Cleared recently viewed books");
        Ok(())
    }

    /// All favorites in the order they were added
    pub fn favorites(&self) -> Vec<BookRecord> {
        self.lock().favorites.clone()
    }

    /// Recently viewed books, newest first
    pub fn recent_books(&self) -> Vec<BookRecord> {
        self.lock().recents.clone()
    }

    /// Favorites matching author and/or title substrings
    ///
    /// Matching is case-insensitive. The author filter is checked against
    /// all authors joined by spaces. When both filters are given a record
    /// must match both; a missing or empty filter matches everything.
    pub fn filter_favorites(&self, author: Option<&str>, title: Option<&str>) -> Vec<BookRecord> {
        let author = author.filter(|a| !a.is_empty()).map(str::to_lowercase);
        let title = title.filter(|t| !t.is_empty()).map(str::to_lowercase);

        self.lock()
            .favorites
            .iter()
            .filter(|f| match &author {
                Some(a) => f.authors.join(" ").to_lowercase().contains(a.as_str()),
                None => true,
            })
            .filter(|f| match &title {
                Some(t) => f.title.to_lowercase().contains(t.as_str()),
                None => true,
            })
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // Commits are single assignments, so a poisoned state is still whole
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Load a store, turning a recovery into a warning
fn load_collecting(
    store: &JsonStore,
    warnings: &mut Vec<LoadWarning>,
) -> StorageResult<Vec<BookRecord>> {
    let loaded = store.load()?;
    if let LoadOutcome::Recovered {
        backup_path,
        details,
    } = loaded.outcome
    {
        warn!("Reset corrupted store {:?}", store.path());
        warnings.push(LoadWarning {
            path: store.path().to_path_buf(),
            backup_path,
            details,
        });
    }
    Ok(loaded.records)
}
