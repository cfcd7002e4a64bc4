//! Live book search
//!
//! Queries the Google Books volumes API. Network and HTTP failures are
//! logged and turned into an empty result, as `BookSearch` requires.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, warn};

use bookfind_core::search::{build_query_string, parse_volumes};
use bookfind_core::{BookRecord, BookSearch, Config, MockSearch, SearchBackend, SearchQuery};

/// Google Books volumes endpoint
const API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Search backed by the Google Books API
pub struct GoogleBooksSearch {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl GoogleBooksSearch {
    pub fn new() -> Result<Self> {
        Self::with_api_url(API_URL)
    }

    /// Point the client at a different endpoint
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT))
            .user_agent(concat!("bookfind/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Inner search that can fail
    fn search_inner(&self, query: &SearchQuery) -> Result<Vec<BookRecord>> {
        let q = build_query_string(query);
        debug!("Searching Google Books for '{}'", q);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", q.as_str())])
            .send()?
            .error_for_status()?;

        let body = response.text()?;
        Ok(parse_volumes(&body))
    }
}

impl BookSearch for GoogleBooksSearch {
    fn search(&self, query: &SearchQuery) -> Vec<BookRecord> {
        match self.search_inner(query) {
            Ok(books) => books,
            Err(e) => {
                warn!("Google Books API request failed: {}", e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Build the search backend selected in the configuration
pub fn backend_for(config: &Config) -> Result<Box<dyn BookSearch>> {
    Ok(match config.search_backend {
        SearchBackend::Google => Box::new(GoogleBooksSearch::new()?),
        SearchBackend::Mock => Box::new(MockSearch::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let mut config = Config::default();
        config.search_backend = SearchBackend::Mock;
        assert_eq!(backend_for(&config).unwrap().name(), "mock");

        config.search_backend = SearchBackend::Google;
        assert_eq!(backend_for(&config).unwrap().name(), "google");
    }

    #[test]
    fn test_unreachable_endpoint_returns_empty() {
        // Port 9 (discard) on localhost refuses connections
        let search = GoogleBooksSearch::with_api_url("http://127.0.0.1:9/volumes").unwrap();
        assert!(search.search(&SearchQuery::text("dune")).is_empty());
    }
}
