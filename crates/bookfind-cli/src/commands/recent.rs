//! Recently viewed command handlers

use anyhow::{Context, Result};

use bookfind_core::FavoritesManager;

use crate::output::Output;

/// List recently viewed books, newest first
pub fn list(manager: &FavoritesManager, output: &Output) -> Result<()> {
    output.print_books(&manager.recent_books(), false, "No recently viewed books!");
    Ok(())
}

/// Forget all recently viewed books
pub fn clear(manager: &FavoritesManager, output: &Output) -> Result<()> {
    manager
        .clear_recents()
        .context("Failed to clear recently viewed books")?;
    output.success("Cleared recently viewed books");
    Ok(())
}
