//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use bookfind_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "export_dir": config.export_dir(),
                    "search_backend": config.search_backend.as_str(),
                    "log_file": config.log_file,
                    "favorites_path": config.favorites_path(),
                    "recents_path": config.recents_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:       {}", config.data_dir.display());
            println!("  export_dir:     {}", config.export_dir().display());
            println!("  search_backend: {}", config.search_backend);
            println!(
                "  log_file:       {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Favorites:   {}", config.favorites_path().display());
            println!("Recents:     {}", config.recents_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "export_dir" => {
            config.export_dir = optional_path(value);
        }
        "search_backend" => {
            config.search_backend = value.parse()?;
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, export_dir, search_backend, log_file",
                key
            );
        }
    }
    Ok(())
}

/// "" or "none" clears an optional path
fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfind_core::SearchBackend;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "search_backend", "mock").unwrap();
        assert_eq!(config.search_backend, SearchBackend::Mock);

        apply(&mut config, "export_dir", "/tmp/out").unwrap();
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/out")));

        apply(&mut config, "export_dir", "none").unwrap();
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_apply_rejects_unknown_key_and_bad_backend() {
        let mut config = Config::default();
        assert!(apply(&mut config, "sync_url", "ws://x").is_err());
        assert!(apply(&mut config, "search_backend", "bing").is_err());
    }
}
