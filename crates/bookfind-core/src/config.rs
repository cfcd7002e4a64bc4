//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/bookfind/config.toml)
//! 3. Environment variables (BOOKFIND_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix
const ENV_PREFIX: &str = "BOOKFIND";

/// Which search implementation the CLI should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Google Books volumes API
    #[default]
    Google,
    /// Built-in sample catalogue, no network
    Mock,
}

impl SearchBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackend::Google => "google",
            SearchBackend::Mock => "mock",
        }
    }
}

impl FromStr for SearchBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SearchBackend::Google),
            "mock" => Ok(SearchBackend::Mock),
            other => bail!("Unknown search backend '{}'. Use 'google' or 'mock'.", other),
        }
    }
}

impl std::fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding favorites.json and recent.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for exported files (defaults to `<data_dir>/exports`)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Search implementation
    #[serde(default)]
    pub search_backend: SearchBackend,

    /// Log file (defaults to `<data_dir>/bookfind.log` when logging is on)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: None,
            search_backend: SearchBackend::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BOOKFIND_DATA_DIR, BOOKFIND_EXPORT_DIR, ...)
    /// 2. Config file (~/.config/bookfind/config.toml or BOOKFIND_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // Empty string clears the override back to the default
        if let Ok(val) = std::env::var(format!("{}_EXPORT_DIR", ENV_PREFIX)) {
            self.export_dir = if val.is_empty() { None } else { Some(val.into()) };
        }

        if let Ok(val) = std::env::var(format!("{}_SEARCH_BACKEND", ENV_PREFIX)) {
            self.search_backend = val
                .parse()
                .with_context(|| format!("Invalid {}_SEARCH_BACKEND", ENV_PREFIX))?;
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() { None } else { Some(val.into()) };
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BOOKFIND_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bookfind")
            .join("config.toml")
    }

    /// Get the path to the favorites store
    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join("favorites.json")
    }

    /// Get the path to the recently viewed store
    pub fn recents_path(&self) -> PathBuf {
        self.data_dir.join("recent.json")
    }

    /// Get the directory exports are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("bookfind.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookfind")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "BOOKFIND_DATA_DIR",
        "BOOKFIND_EXPORT_DIR",
        "BOOKFIND_SEARCH_BACKEND",
        "BOOKFIND_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search_backend, SearchBackend::Google);
        assert!(config.export_dir.is_none());
        assert!(config.data_dir.ends_with("bookfind"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/bookfind"),
            ..Config::default()
        };

        assert_eq!(config.favorites_path(), PathBuf::from("/data/bookfind/favorites.json"));
        assert_eq!(config.recents_path(), PathBuf::from("/data/bookfind/recent.json"));
        assert_eq!(config.export_dir(), PathBuf::from("/data/bookfind/exports"));
        assert_eq!(config.log_path(), PathBuf::from("/data/bookfind/bookfind.log"));
    }

    #[test]
    fn test_explicit_export_dir() {
        let config = Config {
            export_dir: Some(PathBuf::from("/tmp/out")),
            ..Config::default()
        };
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BOOKFIND_DATA_DIR", "/tmp/bookfind-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/bookfind-test"));
    }

    #[test]
    fn test_env_override_search_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BOOKFIND_SEARCH_BACKEND", "MOCK");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.search_backend, SearchBackend::Mock);

        env::set_var("BOOKFIND_SEARCH_BACKEND", "carrier-pigeon");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_export_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BOOKFIND_EXPORT_DIR", "/tmp/exports");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));

        // Empty string clears it
        env::set_var("BOOKFIND_EXPORT_DIR", "");
        config.apply_env_overrides().unwrap();
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_serialization() {
        let config = Config {
            data_dir: PathBuf::from("/data/bookfind"),
            export_dir: Some(PathBuf::from("/data/exports")),
            search_backend: SearchBackend::Mock,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("search_backend = \"mock\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.export_dir, config.export_dir);
        assert_eq!(parsed.search_backend, config.search_backend);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            search_backend = "mock"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.search_backend, SearchBackend::Mock);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("BOOKFIND_DATA_DIR", temp_dir.path().join("data"));

        let config = Config::load_from_path(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.search_backend, SearchBackend::Google);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_to_path_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            export_dir: None,
            search_backend: SearchBackend::Mock,
            log_file: Some(temp_dir.path().join("debug.log")),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.search_backend, SearchBackend::Mock);
        assert_eq!(loaded.log_file, config.log_file);
    }
}
