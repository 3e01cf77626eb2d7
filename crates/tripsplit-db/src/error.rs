//! # Persistence Errors
//!
//! [`DbError`] is what every repository call returns. SQLite failures are
//! sorted into the handful of cases callers act on, and settlement engine
//! failures pass through untouched as [`DbError::Core`].
//!
//! ```text
//!   sqlx::Error ───────┐
//!   MigrateError ──────┼──► DbError ──► anyhow::Error (CLI adds context,
//!   CoreError ─────────┤                 "failed to create expense: ...")
//!   ValidationError ───┘  (as Core(InvalidInput))
//! ```

use thiserror::Error;
use tripsplit_core::{CoreError, ValidationError};

/// Failure of a persistence operation.
#[derive(Debug, Error)]
pub enum DbError {
    /// No person, expense or settlement with that id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row, e.g. the same person twice on one
    /// expense, or seeding a database that already has people.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// More than one person answers to the same name.
    #[error("'{name}' matches {matches} people, use an id instead")]
    AmbiguousName { name: String, matches: usize },

    /// Payer or participant id that is not a known person.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure reported by SQLite.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A commit did not go through; nothing from the unit was kept.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Input rejected or settlement computation failed in the core.
    ///
    /// ## When This Occurs
    /// - Expense input fails validation (blank title, zero nights, ...)
    /// - A stored expense cannot be allocated during recalculation
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// `NotFound` for `entity` ("Person", "Expense", "Settlement").
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for errors caused by bad input rather than by the database.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DbError::Core(CoreError::InvalidInput(_))
                | DbError::UniqueViolation { .. }
                | DbError::AmbiguousName { .. }
                | DbError::ForeignKeyViolation { .. }
        )
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::InvalidInput(err))
    }
}

/// SQLite reports constraint failures only through the message text:
/// `UNIQUE constraint failed: <table>.<column>` and
/// `FOREIGN KEY constraint failed`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(field, "?")
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("database is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
