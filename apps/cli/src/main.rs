//! # tripsplit
//!
//! Command line front end for the trip ledger.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tripsplit Startup                               │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  2. Load AppConfig (defaults < tripsplit.toml < TRIPSPLIT_* env)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. Initialize tracing (RUST_LOG, else config.log_filter)              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  4. Open SQLite database, run migrations                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  5. Run the command, close the pool                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Log Levels
//! Logs go to stderr so `--json` output on stdout stays machine-readable.
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=tripsplit_db=trace` - Trace the persistence layer only

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tripsplit_db::{Database, DbConfig};

mod commands;
mod settings;

use commands::Cli;
use settings::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    init_tracing(&config.log_filter);

    info!(
        database = %config.database_path.display(),
        trip = %config.trip_name,
        "Starting tripsplit"
    );

    let db = open_database(&config).await?;
    let result = commands::run(&db, &config, cli.command, cli.json).await;
    db.close().await;

    result
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the configured filter applies, and a filter
/// that fails to parse falls back to `info`.
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the trip database, creating its directory on first use.
async fn open_database(config: &AppConfig) -> Result<Database> {
    if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let db_config = DbConfig::new(config.database_path.clone()).max_connections(config.max_connections);

    Database::new(db_config)
        .await
        .with_context(|| format!("failed to open database {}", config.database_path.display()))
}
