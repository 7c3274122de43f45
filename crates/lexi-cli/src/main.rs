//! Lexi CLI
//!
//! Command-line interface for Lexi - an offline-tolerant vocabulary notebook.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexi_core::{Config, Engine, EngineEvent, HttpRepository, SqliteStore};

mod commands;
mod output;
mod prompt;

use commands::word::WordFields;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "lexi")]
#[command(about = "Lexi - Offline-tolerant vocabulary notebook")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all words
    #[command(alias = "ls")]
    List,
    /// Search words by word, meaning or synonym
    Search {
        /// Search query
        query: String,
    },
    /// Show a word's details
    Show {
        /// The word (case-insensitive)
        word: String,
    },
    /// Add a new word
    #[command(alias = "create")]
    Add {
        /// The word to add
        word: String,
        #[command(flatten)]
        fields: WordFields,
    },
    /// Edit a word
    Edit {
        /// The word to edit (case-insensitive)
        word: String,
        /// Rename the word
        #[arg(long, value_name = "NEW")]
        rename: Option<String>,
        #[command(flatten)]
        fields: WordFields,
    },
    /// Delete a word
    #[command(alias = "rm")]
    Delete {
        /// The word to delete (case-insensitive)
        word: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Sync with the remote word list
    Sync,
    /// Show status (sync state, pending changes)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, endpoint_url, sync_enabled, request_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store or the network
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config =
        Config::load_with_cli_override(cli.config.as_ref()).context("Failed to load configuration")?;
    init_logging(&config);

    let store = SqliteStore::open(&config).map_err(|e| {
        let hint = e.recovery_suggestion();
        with_hint(e, hint, "Failed to open local store")
    })?;
    let repo = HttpRepository::from_config(&config).context("Failed to create remote client")?;
    let mut engine = Engine::open(store, repo).map_err(|e| {
        let hint = e.recovery_suggestion();
        with_hint(e, hint, "Failed to load local data")
    })?;
    let mut events = engine.take_events();

    let startup = commands::sync::startup(&mut engine).await?;
    print_events(&mut events, &output);

    let result = match cli.command {
        Commands::List => commands::word::list(&engine, &output),
        Commands::Search { query } => commands::word::search(&engine, &query, &output),
        Commands::Show { word } => commands::word::show(&engine, &word, &output),
        Commands::Add { word, fields } => {
            commands::word::add(&mut engine, word, fields, &output).await
        }
        Commands::Edit {
            word,
            rename,
            fields,
        } => commands::word::edit(&mut engine, &word, rename, fields, &output).await,
        Commands::Delete { word, yes } => {
            commands::word::delete(&mut engine, &word, yes, &output).await
        }
        Commands::Sync => commands::sync::sync(&engine, &startup, &output),
        Commands::Status => commands::status::show(&engine, &config, &startup, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    print_events(&mut events, &output);
    result
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Wrap a startup failure, appending its recovery hint to the context
fn with_hint<E>(error: E, hint: Option<&str>, context: &str) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = match hint {
        Some(hint) => format!("{}\nHint: {}", context, hint),
        None => context.to_string(),
    };
    anyhow::Error::new(error).context(message)
}

/// Print the engine notifications raised so far
fn print_events(events: &mut Option<mpsc::UnboundedReceiver<EngineEvent>>, output: &Output) {
    let Some(rx) = events.as_mut() else {
        return;
    };
    while let Ok(event) = rx.try_recv() {
        output.event(&event);
    }
}

/// Initialize logging
///
/// Only initializes if LEXI_LOG environment variable is set.
/// Logs to config.log_file if set, otherwise stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LEXI_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("lexi_core={},lexi_cli={}", log_level, log_level));

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
