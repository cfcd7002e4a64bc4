//! Data models for bookfind
//!
//! Defines `BookRecord`, the single value type shared by search results,
//! favorites, recents and exports.

use serde::{Deserialize, Serialize};

/// A book plus an optional user note
///
/// Equality covers every field, `note` included. It is the only dedup key
/// used by the favorites and recents collections, so the same book saved
/// with two different notes is two distinct entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BookRecord {
    /// Book title
    pub title: String,
    /// Author(s), in the order the source reported them
    #[serde(default)]
    pub authors: Vec<String>,
    /// Optional description or summary
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form publication date (not parsed)
    #[serde(default)]
    pub published_date: Option<String>,
    /// Link to more information
    #[serde(default)]
    pub info_link: String,
    /// User annotation, absent for search results
    #[serde(default)]
    pub note: Option<String>,
}

impl BookRecord {
    /// Create a record with only a title and link
    pub fn new(title: impl Into<String>, info_link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            description: None,
            published_date: None,
            info_link: info_link.into(),
            note: None,
        }
    }

    /// Set the authors
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the publication date
    pub fn with_published_date(mut self, published_date: impl Into<String>) -> Self {
        self.published_date = Some(published_date.into());
        self
    }

    /// Set or clear the note
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Copy of this record with the note removed
    pub fn without_note(&self) -> Self {
        self.clone().with_note(None)
    }

    /// Authors joined with ", " (empty when there are none)
    pub fn authors_joined(&self) -> String {
        self.authors.join(", ")
    }
}

impl std::fmt::Display for BookRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let authors = if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors_joined()
        };
        writeln!(f, "{}", self.title)?;
        writeln!(f, "   Author(s): {}", authors)?;
        writeln!(
            f,
            "   Published: {}",
            non_empty(&self.published_date).unwrap_or("Unknown")
        )?;
        writeln!(
            f,
            "   Summary:   {}",
            non_empty(&self.description).unwrap_or("No description available")
        )?;
        writeln!(f, "   More Info: {}", self.info_link)?;
        write!(
            f,
            "   Note:      {}",
            non_empty(&self.note).unwrap_or("No note added")
        )
    }
}

/// Borrow an optional string, treating "" as absent
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookRecord {
        BookRecord::new("Dune", "https://books.example/dune")
            .with_authors(["Frank Herbert"])
            .with_published_date("1965")
    }

    #[test]
    fn test_record_new() {
        let book = BookRecord::new("Dune", "https://books.example/dune");
        assert_eq!(book.title, "Dune");
        assert!(book.authors.is_empty());
        assert!(book.description.is_none());
        assert!(book.note.is_none());
    }

    #[test]
    fn test_equality_includes_note() {
        let plain = dune();
        let noted = dune().with_note(Some("sci-fi".to_string()));
        assert_ne!(plain, noted);
        assert_eq!(noted.without_note(), plain);
        assert_eq!(dune(), dune());
    }

    #[test]
    fn test_authors_joined() {
        let book = dune().with_authors(["X", "Y"]);
        assert_eq!(book.authors_joined(), "X, Y");
        assert_eq!(BookRecord::new("A", "").authors_joined(), "");
    }

    #[test]
    fn test_display_fallbacks() {
        let text = BookRecord::new("Untitled", "http://x").to_string();
        assert!(text.contains("Author(s): Unknown"));
        assert!(text.contains("Published: Unknown"));
        assert!(text.contains("No description available"));
        assert!(text.contains("No note added"));
    }

    #[test]
    fn test_serialization_field_order_and_null_note() {
        let json = serde_json::to_string(&dune()).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Dune","authors":["Frank Herbert"],"description":null,"published_date":"1965","info_link":"https://books.example/dune","note":null}"#
        );
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let book: BookRecord =
            serde_json::from_str(r#"{"title":"Dune","info_link":"http://x"}"#).unwrap();
        assert_eq!(book.title, "Dune");
        assert!(book.authors.is_empty());
        assert!(book.note.is_none());
        assert!(book.published_date.is_none());
    }
}
