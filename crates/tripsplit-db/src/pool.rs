//! # Opening the Trip Database
//!
//! [`DbConfig`] describes where the ledger lives and how many connections
//! to keep; [`Database`] is the handle every command goes through.
//!
//! ```text
//!   DbConfig::new("trip.db")           DbConfig::in_memory()
//!        │  WAL, NORMAL sync, FKs on         │  one connection, no WAL
//!        └──────────────┬────────────────────┘
//!                       ▼
//!              Database::new(config)
//!                       │  migrate (unless disabled)
//!                       ▼
//!   ┌──────────────────────────────────────────────────────┐
//!   │ Database { pool, recompute_lock }                    │
//!   │   people()      → PersonRepository                   │
//!   │   expenses()    → ExpenseRepository                  │
//!   │   settlements() → SettlementRepository (shares lock) │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! Readers listing settlements are not blocked by a recalculation in
//! progress on file databases, since the journal runs in WAL mode.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::expense::ExpenseRepository;
use crate::repository::person::PersonRepository;
use crate::repository::settlement::SettlementRepository;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the trip ledger lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("lake-weekend.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open.
    pub database_path: PathBuf,

    /// Pool ceiling (default 5).
    pub max_connections: u32,

    /// Connections kept open while idle (default 1).
    pub min_connections: u32,

    /// How long to wait for a free connection (default 30s).
    pub connect_timeout: Duration,

    /// Idle connections are closed after this long (default 10 min).
    pub idle_timeout: Duration,

    /// Apply pending migrations in [`Database::new`] (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a file database with default pool settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn run_migrations(mut self, run_migrations: bool) -> Self {
        self.run_migrations = run_migrations;
        self
    }

    /// A private in-memory database, used by tests.
    ///
    /// Every call yields a separate, empty database. It lives on a single
    /// connection, so code must not acquire a second connection while a
    /// transaction is open.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(3600),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            // A plain filename, never a URL: `?` and `#` are legal in paths
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite
            .foreign_keys(true)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the trip ledger.
///
/// Cheap to clone. Clones share the pool and the recalculation lock, so
/// hand clones to concurrent tasks rather than opening a second handle on
/// the same file.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,

    /// Serializes settlement recalculation within this process.
    recompute_lock: Arc<Mutex<()>>,
}

impl Database {
    /// Opens (or creates) the database and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening trip database");

        let connect_options = config.connect_options()?;
        debug!(in_memory = config.is_in_memory(), "SQLite options ready");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max = config.max_connections, "SQLite pool ready");

        let db = Database {
            pool,
            recompute_lock: Arc::new(Mutex::new(())),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn people(&self) -> PersonRepository {
        PersonRepository::new(self.pool.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.pool.clone())
    }

    /// Settlement access. All repositories handed out by one `Database`
    /// share its recalculation lock.
    ///
    /// ```rust,ignore
    /// let settlements = db.settlements().recalculate().await?;
    /// ```
    pub fn settlements(&self) -> SettlementRepository {
        SettlementRepository::new(self.pool.clone(), Arc::clone(&self.recompute_lock))
    }

    /// Closes the pool; later queries fail with a connection error.
    pub async fn close(&self) {
        debug!("Closing trip database");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
