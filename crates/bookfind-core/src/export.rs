//! Favorites export
//!
//! Serializes a snapshot of favorites to CSV, JSON or Markdown. Rendering is
//! pure (`render`); `Exporter` adds file naming and an atomic write.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::models::{non_empty, BookRecord};
use crate::storage::{atomic_write, StorageError};

/// CSV header, in column order
pub const CSV_HEADER: [&str; 6] = [
    "title",
    "authors",
    "description",
    "published_date",
    "info_link",
    "note",
];

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    /// Format name not recognised
    #[error("Unsupported export format '{0}'. Use csv, json or md.")]
    UnsupportedFormat(String),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render records in the given format
pub fn render(records: &[BookRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => render_csv(records),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Markdown => Ok(render_markdown(records)),
    }
}

fn render_csv(records: &[BookRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for book in records {
        writer.write_record([
            book.title.as_str(),
            book.authors_joined().as_str(),
            book.description.as_deref().unwrap_or(""),
            book.published_date.as_deref().unwrap_or(""),
            book.info_link.as_str(),
            book.note.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    // Every field came from a String, so the buffer is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_markdown(records: &[BookRecord]) -> String {
    let mut out = String::from("# Favorite Books\n\n");

    for book in records {
        let authors = if book.authors.is_empty() {
            "Unknown".to_string()
        } else {
            book.authors_joined()
        };

        out.push_str(&format!("## {}\n", book.title));
        out.push_str(&format!("**Authors:** {}\n", authors));
        out.push_str(&format!(
            "**Published:** {}\n",
            non_empty(&book.published_date).unwrap_or("Unknown")
        ));
        out.push_str(&format!(
            "**Note:** {}\n",
            non_empty(&book.note).unwrap_or("No note")
        ));
        out.push_str(&format!("**Link:** {}\n\n", book.info_link));

        if let Some(description) = non_empty(&book.description) {
            out.push_str(&format!("### Description\n{}\n\n", description));
        }

        out.push_str("---\n\n");
    }

    out
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter writing under `export_dir`
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Directory exports are written to
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Export records and return the path written
    ///
    /// Without a filename a timestamped `favorites_export_<YYYYMMDD_HHMMSS>`
    /// name is used. Relative filenames are placed in the export directory,
    /// and the format's extension is appended when missing.
    pub fn export(
        &self,
        records: &[BookRecord],
        format: ExportFormat,
        filename: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        let path = self.resolve_path(format, filename);
        let content = render(records, format)?;

        atomic_write(&path, content.as_bytes())?;

        info!(
            "Exported {} favorite(s) as {} to {:?}",
            records.len(),
            format,
            path
        );
        Ok(path)
    }

    /// Work out where an export will be written
    pub fn resolve_path(&self, format: ExportFormat, filename: Option<&Path>) -> PathBuf {
        let ext = format.extension();

        let Some(filename) = filename.filter(|f| !f.as_os_str().is_empty()) else {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            return self
                .export_dir
                .join(format!("favorites_export_{}.{}", stamp, ext));
        };

        let path = if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            self.export_dir.join(filename)
        };

        if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            path
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> BookRecord {
        BookRecord::new("A", "http://x")
            .with_authors(["X", "Y"])
            .with_description("d")
            .with_published_date("2020")
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);

        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(ref f) if f == "pdf"));
    }

    #[test]
    fn test_csv_header_and_authors() {
        let csv = render(&[sample()], ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "title,authors,description,published_date,info_link,note");
        assert_eq!(lines[1], "A,\"X, Y\",d,2020,http://x,");
    }

    #[test]
    fn test_csv_reads_back() {
        let book = sample().with_note(Some("has \"quotes\", commas\nand lines".into()));
        let csv = render(&[book.clone()], ExportFormat::Csv).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "X, Y");
        assert_eq!(&rows[0][5], book.note.as_deref().unwrap());
    }

    #[test]
    fn test_csv_empty_collection_has_header_only() {
        let csv = render(&[], ExportFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "title,authors,description,published_date,info_link,note");
    }

    #[test]
    fn test_json_keeps_note_and_unicode() {
        let book = BookRecord::new("Solaris", "http://x")
            .with_authors(["Stanisław Lem"])
            .with_note(Some("océan".into()));
        let json = render(&[book.clone()], ExportFormat::Json).unwrap();

        assert!(json.contains("Stanisław Lem"));
        assert!(json.contains("\"note\": \"océan\""));
        let parsed: Vec<BookRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![book]);
    }

    #[test]
    fn test_markdown_sections() {
        let noted = sample().with_note(Some("great".into()));
        let bare = BookRecord::new("B", "http://y");
        let md = render(&[noted, bare], ExportFormat::Markdown).unwrap();

        assert!(md.starts_with("# Favorite Books\n\n## A\n"));
        assert!(md.contains("**Authors:** X, Y\n"));
        assert!(md.contains("**Published:** 2020\n"));
        assert!(md.contains("**Note:** great\n"));
        assert!(md.contains("**Link:** http://x\n\n### Description\nd\n\n---\n\n"));

        let second = &md[md.find("## B").unwrap()..];
        assert!(second.contains("**Authors:** Unknown\n"));
        assert!(second.contains("**Published:** Unknown\n"));
        assert!(second.contains("**Note:** No note\n"));
        assert!(!second.contains("### Description"));
        assert_eq!(md.matches("---\n").count(), 2);
    }

    #[test]
    fn test_markdown_skips_empty_description() {
        let book = BookRecord::new("C", "http://z").with_description("");
        let md = render(&[book], ExportFormat::Markdown).unwrap();
        assert!(!md.contains("### Description"));
    }

    #[test]
    fn test_export_default_filename() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = Exporter::new(temp_dir.path().join("exports"));

        let path = exporter.export(&[sample()], ExportFormat::Csv, None).unwrap();

        assert!(path.starts_with(temp_dir.path().join("exports")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("favorites_export_"));
        assert!(name.ends_with(".csv"));
        // favorites_export_YYYYMMDD_HHMMSS.csv
        assert_eq!(name.len(), "favorites_export_".len() + 15 + ".csv".len());
        assert!(fs::read_to_string(&path).unwrap().starts_with("title,authors"));
    }

    #[test]
    fn test_export_named_file_gets_extension() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = Exporter::new(temp_dir.path());

        let path = exporter
            .export(&[sample()], ExportFormat::Markdown, Some(Path::new("my-books")))
            .unwrap();
        assert_eq!(path, temp_dir.path().join("my-books.md"));
        assert!(path.exists());

        let kept = exporter.resolve_path(ExportFormat::Json, Some(Path::new("list.json")));
        assert_eq!(kept, temp_dir.path().join("list.json"));
    }

    #[test]
    fn test_export_absolute_path() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = Exporter::new(temp_dir.path().join("unused"));
        let target = temp_dir.path().join("elsewhere").join("out.json");

        let path = exporter
            .export(&[sample()], ExportFormat::Json, Some(target.as_path()))
            .unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
        assert!(!temp_dir.path().join("unused").exists());
    }
}
