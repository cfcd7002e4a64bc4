//! bookfind Core Library
//!
//! This crate provides the core functionality for bookfind, a small tool
//! for collecting, annotating and exporting book records found through search.
//!
//! # Architecture
//!
//! - **JSON files**: Source of truth for favorites and recently viewed books
//! - **FavoritesManager**: Owns both collections and enforces dedup/eviction
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let manager = FavoritesManager::open(&config)?;
//!
//! // Save a book with a note
//! let book = BookRecord::new("Dune", "https://books.example/dune");
//! manager.add_favorite(&book, Some("sci-fi".to_string()))?;
//!
//! // Export everything
//! let exporter = Exporter::new(config.export_dir());
//! exporter.export(&manager.favorites(), ExportFormat::Markdown, None)?;
//! ```
//!
//! # Modules
//!
//! - `models`: The `BookRecord` value type
//! - `storage`: JSON file persistence with corruption recovery
//! - `favorites`: Favorites and recents business rules
//! - `export`: CSV, JSON and Markdown export
//! - `search`: Search capability interface and the mock backend
//! - `config`: Application configuration

pub mod config;
pub mod export;
pub mod favorites;
pub mod models;
pub mod search;
pub mod storage;

pub use config::{Config, SearchBackend};
pub use export::{ExportError, ExportFormat, Exporter};
pub use favorites::{FavoritesManager, LoadWarning, RECENTS_CAPACITY};
pub use models::BookRecord;
pub use search::{BookSearch, MockSearch, SearchQuery};
pub use storage::{JsonStore, LoadOutcome, Loaded, StorageError, StorageResult};
