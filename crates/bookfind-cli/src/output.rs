//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use bookfind_core::BookRecord;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print one book in full, headed "Book i/n"
    pub fn print_book(&self, book: &BookRecord, index: usize, total: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("── Book {}/{} ──", index, total);
                println!("{}", book);
            }
            OutputFormat::Json => {
                println!("{}", to_json(book));
            }
            OutputFormat::Quiet => {
                println!("{}", book.title);
            }
        }
    }

    /// Print a numbered list of books
    ///
    /// `with_notes` adds the note column used for favorites.
    pub fn print_books(&self, books: &[BookRecord], with_notes: bool, empty_message: &str) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("{}", empty_message);
                    return;
                }
                for (i, book) in books.iter().enumerate() {
                    let authors = if book.authors.is_empty() {
                        "Unknown".to_string()
                    } else {
                        book.authors_joined()
                    };
                    if with_notes {
                        println!(
                            "{:>3} | {} | {} | {}",
                            i + 1,
                            truncate(&book.title, 40),
                            truncate(&authors, 30),
                            truncate(book.note.as_deref().unwrap_or("No note"), 30)
                        );
                    } else {
                        println!(
                            "{:>3} | {} | {}",
                            i + 1,
                            truncate(&book.title, 40),
                            truncate(&authors, 30)
                        );
                    }
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => {
                println!("{}", to_json(books));
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.title);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (shown unless quiet)
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    })
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
