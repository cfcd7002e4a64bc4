//! Export command handler

use std::path::PathBuf;

use anyhow::{Context, Result};

use bookfind_core::{Config, ExportFormat, Exporter, FavoritesManager};

use crate::output::{Output, OutputFormat};

/// Export all favorites in the chosen format
pub fn export(
    manager: &FavoritesManager,
    config: &Config,
    format: &str,
    filename: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let favorites = manager.favorites();

    let exporter = Exporter::new(config.export_dir());
    let path = exporter
        .export(&favorites, format, filename.as_deref())
        .context("Failed to export favorites")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "path": path,
                    "format": format.extension(),
                    "count": favorites.len()
                })
            );
        }
        OutputFormat::Quiet => println!("{}", path.display()),
        OutputFormat::Human => {
            output.success(&format!(
                "Exported {} favorite(s) to {}",
                favorites.len(),
                path.display()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfind_core::BookRecord;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_into_export_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let manager = FavoritesManager::open(&config).unwrap();
        manager
            .add_favorite(&BookRecord::new("Dune", "http://x"), None)
            .unwrap();

        let output = Output::new(OutputFormat::Quiet);
        export(&manager, &config, "md", Some("mine".into()), &output).unwrap();

        let written = std::fs::read_to_string(config.export_dir().join("mine.md")).unwrap();
        assert!(written.contains("## Dune"));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let manager = FavoritesManager::open(&config).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        let err = export(&manager, &config, "pdf", None, &output).unwrap_err();
        assert!(err.to_string().contains("Unsupported export format"));
        assert!(!config.export_dir().exists());
    }
}
