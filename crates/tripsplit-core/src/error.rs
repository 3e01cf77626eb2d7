//! # Error Types
//!
//! Domain-specific error types for tripsplit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tripsplit-core errors (this file)                                     │
//! │  ├── CoreError        - Settlement engine failures                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tripsplit-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CLI (anyhow)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed input is rejected at the boundary. The engine never tries to
//! "fix" a financial amount on the caller's behalf.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Settlement engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A precondition on the input was violated.
    ///
    /// ## When This Occurs
    /// - Zero or negative expense total
    /// - Empty participant list, or the same person listed twice
    /// - A weighted split where someone has no nights (or zero nights)
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Balances handed to the debt simplifier do not net to zero.
    ///
    /// ## When This Occurs
    /// Only when the balance computation upstream is broken: every cent
    /// credited to a payer is debited from a participant, so a closed set
    /// of balances always sums to zero. Settling an unbalanced set would
    /// produce a misleading partial settlement, so it is refused.
    #[error("Balances do not net to zero (off by {net_cents} cents)")]
    DataIntegrityViolation { net_cents: i64 },

    /// Pre-allocated shares for an expense do not add up to its total.
    #[error("Shares for expense {expense_id} sum to {actual_cents} cents, expected {expected_cents}")]
    ShareMismatch {
        expense_id: String,
        expected_cents: i64,
        actual_cents: i64,
    },

    /// An intermediate amount left the representable range.
    #[error("Amount out of range")]
    AmountOverflow,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before the settlement engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, unparseable dollar amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., the same participant twice on one expense).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
