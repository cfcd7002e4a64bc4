//! Favorites command handlers

use anyhow::{bail, Context, Result};

use bookfind_core::FavoritesManager;

use crate::output::Output;
use crate::prompt::confirm;

/// List favorites, optionally filtered by author and/or title
pub fn list(
    manager: &FavoritesManager,
    author: Option<String>,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    let favorites = manager.filter_favorites(author.as_deref(), title.as_deref());
    let empty = if author.is_some() || title.is_some() {
        "No favorites match that filter."
    } else {
        "No favorite books yet!"
    };

    output.print_books(&favorites, true, empty);
    Ok(())
}

/// Save a book from the recently viewed list
pub fn add(
    manager: &FavoritesManager,
    recent: usize,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let recents = manager.recent_books();
    let Some(book) = recent.checked_sub(1).and_then(|i| recents.get(i)) else {
        bail!(
            "No recently viewed book number {} ({} available). See `bookfind recent`.",
            recent,
            recents.len()
        );
    };

    if manager
        .add_favorite(book, note)
        .context("Failed to save favorite")?
    {
        output.success(&format!("Added '{}' to favorites", book.title));
    } else {
        output.message(&format!("'{}' is already in favorites", book.title));
    }
    Ok(())
}

/// Remove all favorites with the given title
pub fn remove(manager: &FavoritesManager, title: String, yes: bool, output: &Output) -> Result<()> {
    let matching = manager
        .favorites()
        .iter()
        .filter(|f| f.title == title)
        .count();

    if matching == 0 {
        output.message(&format!("No favorites titled '{}'", title));
        return Ok(());
    }

    if !yes && output.should_prompt() {
        let prompt = format!("Remove {} favorite(s) titled '{}'?", matching, title);
        if !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = manager
        .remove_favorite(&title)
        .context("Failed to remove favorite")?;
    output.success(&format!("Removed {} favorite(s) titled '{}'", removed, title));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use bookfind_core::BookRecord;
    use tempfile::TempDir;

    fn manager(temp_dir: &TempDir) -> FavoritesManager {
        FavoritesManager::open_at(
            temp_dir.path().join("favorites.json"),
            temp_dir.path().join("recent.json"),
        )
        .unwrap()
    }

    #[test]
    fn test_add_from_recents() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);
        manager.add_recent(&BookRecord::new("Dune", "http://x")).unwrap();
        manager.add_recent(&BookRecord::new("Emma", "http://y")).unwrap();

        add(&manager, 2, Some("gift".into()), &output).unwrap();

        let favorites = manager.favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "Dune");
        assert!(add(&manager, 3, None, &output).is_err());
    }

    #[test]
    fn test_remove_without_prompt_in_quiet_mode() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);
        let dune = BookRecord::new("Dune", "http://x");
        manager.add_favorite(&dune, Some("a".into())).unwrap();
        manager.add_favorite(&dune, Some("b".into())).unwrap();

        remove(&manager, "Dune".into(), false, &output).unwrap();
        assert!(manager.favorites().is_empty());

        remove(&manager, "Dune".into(), false, &output).unwrap();
    }
}
