//! Book search capability
//!
//! The rest of the core never talks to a search backend directly; it only
//! receives `BookRecord`s. Backends implement `BookSearch`, which must not
//! fail to its caller: errors are logged by the backend and an empty result
//! is returned instead.

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::BookRecord;

/// Search criteria; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text query
    pub query: Option<String>,
    /// Restrict to titles containing this
    pub title: Option<String>,
    /// Restrict to authors containing this
    pub author: Option<String>,
    /// Language code (e.g. "en")
    pub lang: Option<String>,
}

impl SearchQuery {
    /// A free-text query
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// True when no criterion that narrows results is set
    pub fn is_empty(&self) -> bool {
        [&self.query, &self.title, &self.author]
            .iter()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// A source of candidate book records
pub trait BookSearch {
    /// Search for books; failures yield an empty list
    fn search(&self, query: &SearchQuery) -> Vec<BookRecord>;

    /// Short backend name for logs and status output
    fn name(&self) -> &str;
}

/// In-memory catalogue used for offline use and tests
#[derive(Debug, Clone)]
pub struct MockSearch {
    books: Vec<BookRecord>,
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::with_books(vec![
            BookRecord::new("The Test Book", "http://example.com/test-book")
                .with_authors(["Test Author"])
                .with_description("A test book description")
                .with_published_date("2023-01-01"),
            BookRecord::new("Another Test Book", "http://example.com/another-test-book")
                .with_authors(["Another Author"])
                .with_description("Another test book description")
                .with_published_date("2023-02-01"),
        ])
    }
}

impl MockSearch {
    /// Create a catalogue with the given books
    pub fn with_books(books: Vec<BookRecord>) -> Self {
        Self { books }
    }
}

impl BookSearch for MockSearch {
    fn search(&self, query: &SearchQuery) -> Vec<BookRecord> {
        let title = lowered(&query.title);
        let author = lowered(&query.author);
        let text = lowered(&query.query);

        let results: Vec<BookRecord> = self
            .books
            .iter()
            .filter(|b| title.as_ref().map_or(true, |t| b.title.to_lowercase().contains(t)))
            .filter(|b| author.as_ref().map_or(true, |a| any_author_contains(b, a)))
            .filter(|b| {
                text.as_ref().map_or(true, |q| {
                    b.title.to_lowercase().contains(q)
                        || any_author_contains(b, q)
                        || b.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(q))
                })
            })
            .cloned()
            .collect();

        info!("Mock search returned {} book(s)", results.len());
        results
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn lowered(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn any_author_contains(book: &BookRecord, needle: &str) -> bool {
    book.authors.iter().any(|a| a.to_lowercase().contains(needle))
}

/// Build a Google Books `q` parameter from search criteria
///
/// Terms are joined with `+`: the free query, then `intitle:`, `inauthor:`
/// and `lang:` qualifiers.
pub fn build_query_string(query: &SearchQuery) -> String {
    let mut terms = Vec::new();
    if let Some(q) = non_blank(&query.query) {
        terms.push(q.to_string());
    }
    if let Some(title) = non_blank(&query.title) {
        terms.push(format!("intitle:{}", title));
    }
    if let Some(author) = non_blank(&query.author) {
        terms.push(format!("inauthor:{}", author));
    }
    if let Some(lang) = non_blank(&query.lang) {
        terms.push(format!("lang:{}", lang));
    }
    terms.join("+")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    published_date: Option<String>,
    info_link: Option<String>,
}

/// Convert a Google Books `volumes` response body into records
///
/// Missing titles become "Unknown Title" and missing links become "".
/// A body that cannot be parsed yields no records.
pub fn parse_volumes(body: &str) -> Vec<BookRecord> {
    let response: VolumesResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Error processing search response: {}", e);
            return Vec::new();
        }
    };

    let books: Vec<BookRecord> = response
        .items
        .into_iter()
        .map(|item| {
            let info = item.volume_info;
            BookRecord {
                title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
                authors: info.authors,
                description: info.description,
                published_date: info.published_date,
                info_link: info.info_link.unwrap_or_default(),
                note: None,
            }
        })
        .collect();

    info!("Successfully processed {} book(s)", books.len());
    books
}
