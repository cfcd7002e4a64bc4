//! bookfind CLI
//!
//! Command-line interface for bookfind - search for books, keep favorites
//! with notes, and export them.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookfind_core::{Config, ExportError, FavoritesManager, SearchQuery, StorageError};

mod commands;
mod output;
mod prompt;
mod search;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bookfind")]
#[command(about = "bookfind - Search for books, save favorites, export them")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for books
    Search {
        /// Free-text query (title, author or keyword)
        query: Option<String>,
        /// Only titles containing this
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Only authors containing this
        #[arg(short, long)]
        author: Option<String>,
        /// Language code, e.g. "en"
        #[arg(short, long)]
        lang: Option<String>,
        /// Save the result with this number (1-based) to favorites; repeatable
        #[arg(short, long)]
        save: Vec<usize>,
        /// Note to attach to saved results
        #[arg(short, long)]
        note: Option<String>,
        /// Step through results one at a time
        #[arg(short, long)]
        interactive: bool,
    },
    /// Manage favorites
    #[command(alias = "fav")]
    Favorites {
        #[command(subcommand)]
        command: Option<FavoriteCommands>,
    },
    /// Recently viewed books
    Recent {
        #[command(subcommand)]
        command: Option<RecentCommands>,
    },
    /// Export favorites to a file
    Export {
        /// csv, json or md
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// File name or path (default: timestamped name in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// List favorites, optionally filtered
    #[command(alias = "ls")]
    List {
        /// Only authors containing this (case-insensitive)
        #[arg(short, long)]
        author: Option<String>,
        /// Only titles containing this (case-insensitive)
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// Save a recently viewed book to favorites
    Add {
        /// Number of the book in `bookfind recent` (1-based)
        recent: usize,
        /// Note to attach
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Remove every favorite with this exact title
    #[command(alias = "rm")]
    Remove {
        /// Title to remove
        title: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RecentCommands {
    /// List recently viewed books, newest first
    #[command(alias = "ls")]
    List,
    /// Forget all recently viewed books
    Clear,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, export_dir, search_backend, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    run(cli, &output).inspect_err(|err| {
        if let Some(hint) = storage_error(err).and_then(|e| e.recovery_suggestion()) {
            output.warning(hint);
        }
    })
}

/// Find the storage failure behind a command error, if there is one
fn storage_error(err: &anyhow::Error) -> Option<&StorageError> {
    err.chain().find_map(|cause| {
        cause.downcast_ref::<StorageError>().or_else(|| {
            match cause.downcast_ref::<ExportError>() {
                Some(ExportError::Storage(inner)) => Some(inner),
                _ => None,
            }
        })
    })
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands don't need the stores
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let manager = FavoritesManager::open(&config).context("Failed to open favorites")?;
    for warning in manager.load_warnings() {
        output.warning(&warning.to_string());
    }

    match cli.command {
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Search {
            query,
            title,
            author,
            lang,
            save,
            note,
            interactive,
        } => {
            let backend = search::backend_for(&config)?;
            let query = SearchQuery {
                query,
                title,
                author,
                lang,
            };
            if interactive {
                commands::search::browse(&manager, backend.as_ref(), query, output)
            } else {
                commands::search::run(&manager, backend.as_ref(), query, save, note, output)
            }
        }
        Commands::Favorites { command } => match command {
            Some(FavoriteCommands::List { author, title }) => {
                commands::favorite::list(&manager, author, title, output)
            }
            None => commands::favorite::list(&manager, None, None, output),
            Some(FavoriteCommands::Add { recent, note }) => {
                commands::favorite::add(&manager, recent, note, output)
            }
            Some(FavoriteCommands::Remove { title, yes }) => {
                commands::favorite::remove(&manager, title, yes, output)
            }
        },
        Commands::Recent { command } => match command {
            Some(RecentCommands::List) | None => commands::recent::list(&manager, output),
            Some(RecentCommands::Clear) => commands::recent::clear(&manager, output),
        },
        Commands::Export {
            format,
            output: filename,
        } => commands::export::export(&manager, &config, &format, filename, output),
    }
}

/// Initialize file logging
///
/// Only initializes if BOOKFIND_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/bookfind.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("BOOKFIND_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "bookfind_core={},bookfind_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
