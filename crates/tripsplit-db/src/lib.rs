//! # tripsplit-db: Persistence Layer for tripsplit
//!
//! This crate stores people, expenses and settlements in SQLite and runs
//! the settlement engine over consistent snapshots of them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        tripsplit Data Flow                              │
//! │                                                                         │
//! │  tripsplit settle recalc                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tripsplit-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │ │   │
//! │  │   │               │    │ PersonRepo     │    │ 001_initial  │ │   │
//! │  │   │ SqlitePool    │◄───│ ExpenseRepo    │    │  _schema.sql │ │   │
//! │  │   │ recompute lock│    │ SettlementRepo │    │              │ │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘ │   │
//! │  │                                │ snapshot                      │   │
//! │  │                                ▼                               │   │
//! │  │                  tripsplit-core::compute_settlement            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        <platform data dir>/tripsplit/tripsplit.db               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - People, expenses, settlements
//! - [`seed`] - Sample trip for development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripsplit_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("trip.db")).await?;
//!
//! let ana = db.people().create("Ana", None, 3).await?;
//! let settlements = db.settlements().recalculate().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::person::PersonRepository;
pub use repository::settlement::SettlementRepository;
pub use seed::{seed_sample_trip, SeedSummary};
