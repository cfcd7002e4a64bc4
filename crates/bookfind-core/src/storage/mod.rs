//! Storage layer
//!
//! Handles JSON persistence of ordered book collections.
//!
//! ## Guarantees
//!
//! - **Atomic writes**: every save goes through a temp file and a rename
//! - **Corruption recovery**: an unreadable file is set aside as a backup
//!   and reported as `LoadOutcome::Recovered`, never as an error

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonStore, LoadOutcome, Loaded};

pub(crate) use persistence::atomic_write;
