//! Search command handlers

use anyhow::{bail, Context, Result};

use bookfind_core::{BookRecord, BookSearch, FavoritesManager, SearchQuery};

use crate::output::Output;
use crate::prompt::{prompt_choice, prompt_optional};

const NO_RESULTS: &str = "No books found. Try a different search term.";

/// Search, record results as recently viewed, and optionally save some
pub fn run(
    manager: &FavoritesManager,
    backend: &dyn BookSearch,
    query: SearchQuery,
    save: Vec<usize>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let query = ensure_query(query, output)?;
    let books = backend.search(&query);

    if books.is_empty() {
        output.message(NO_RESULTS);
        return Ok(());
    }

    for book in &books {
        manager.add_recent(book).context("Failed to record recent book")?;
    }
    output.print_books(&books, false, NO_RESULTS);

    for index in save {
        let book = pick(&books, index)?;
        save_favorite(manager, book, note.clone(), output)?;
    }

    Ok(())
}

/// Step through results one at a time
///
/// Every book shown is recorded as recently viewed.
pub fn browse(
    manager: &FavoritesManager,
    backend: &dyn BookSearch,
    query: SearchQuery,
    output: &Output,
) -> Result<()> {
    if !output.should_prompt() {
        bail!("Interactive search needs human output; drop --json/--quiet.");
    }

    let query = ensure_query(query, output)?;
    let books = backend.search(&query);

    if books.is_empty() {
        output.message(NO_RESULTS);
        return Ok(());
    }

    let mut current = 0;
    while current < books.len() {
        let book = &books[current];
        manager.add_recent(book).context("Failed to record recent book")?;
        output.print_book(book, current + 1, books.len());

        println!();
        println!("  y - Add to favorites (with optional note)");
        println!("  n - Next book");
        println!("  b - Previous book");
        println!("  l - List all results");
        println!("  q - Quit");

        match prompt_choice("Choose action", &["y", "n", "b", "l", "q"], "n")?.as_str() {
            "y" => {
                let note = prompt_optional("Add a note (leave blank to skip)")?;
                save_favorite(manager, book, note, output)?;
                current += 1;
            }
            "b" => current = current.saturating_sub(1),
            "l" => {
                output.print_books(&books, false, NO_RESULTS);
                let choices: Vec<String> = (1..=books.len()).map(|i| i.to_string()).collect();
                let choice_refs: Vec<&str> = choices.iter().map(String::as_str).collect();
                let selected = prompt_choice("Book number to view", &choice_refs, "1")?;
                current = selected.parse::<usize>()?.saturating_sub(1);
            }
            "q" => break,
            _ => current += 1,
        }
    }

    Ok(())
}

/// Ask for a query when none was given on the command line
fn ensure_query(query: SearchQuery, output: &Output) -> Result<SearchQuery> {
    if !query.is_empty() {
        return Ok(query);
    }
    if !output.should_prompt() {
        bail!("Nothing to search for. Give a query, --title or --author.");
    }

    match prompt_optional("Enter a book title, author, or keyword")? {
        Some(text) => Ok(SearchQuery {
            query: Some(text),
            ..query
        }),
        None => bail!("Nothing to search for."),
    }
}

fn pick(books: &[BookRecord], index: usize) -> Result<&BookRecord> {
    match index.checked_sub(1).and_then(|i| books.get(i)) {
        Some(book) => Ok(book),
        None => bail!(
            "No result number {}. Choose between 1 and {}.",
            index,
            books.len()
        ),
    }
}

fn save_favorite(
    manager: &FavoritesManager,
    book: &BookRecord,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
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
