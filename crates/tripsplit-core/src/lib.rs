//! # tripsplit-core: Pure Settlement Engine for tripsplit
//!
//! This crate is the **heart** of tripsplit. It turns a snapshot of trip
//! expenses into fair shares, net balances and a short list of payments,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        tripsplit Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tripsplit CLI (apps/cli)                     │   │
//! │  │    person add ──► expense add ──► balances ──► settle recalc   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               tripsplit-db (Persistence Layer)                  │   │
//! │  │     people, expenses, participants, settlements (SQLite)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshot in, records out               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tripsplit-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ allocation │  │  balance  │  │ simplify  │  │settlement │  │   │
//! │  │   │  even /    │─►│  net per  │─►│  greedy   │─►│  status   │  │   │
//! │  │   │  nights    │  │  person   │  │  matching │  │  plan     │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Person, Expense, Transaction, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`allocation`] - Per-expense share allocation
//! - [`balance`] - Net balance aggregation
//! - [`simplify`] - Debt simplification
//! - [`settlement`] - Settlement status and the full pipeline
//!
//! ## Invariants
//!
//! 1. **Shares sum to the total**: no cent is lost or invented per expense
//! 2. **Balances sum to zero**: every credit has a matching debit
//! 3. **Payments settle everyone**: applying them zeroes every balance
//! 4. **No ambient identity**: every person id is passed in explicitly
//!
//! ## Example Usage
//!
//! ```rust
//! use tripsplit_core::{simplify, PersonBalance};
//!
//! let balances = [
//!     PersonBalance::new("alice", 500),
//!     PersonBalance::new("bob", -300),
//!     PersonBalance::new("carol", -200),
//! ];
//!
//! let payments = simplify(&balances).unwrap();
//! assert_eq!(payments[0].to, "alice");
//! assert_eq!(payments[0].amount_cents, 300);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod balance;
pub mod error;
pub mod money;
pub mod settlement;
pub mod simplify;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{allocate, allocate_expense, verify_shares};
pub use balance::{aggregate, expenses_by_category, person_summary, PersonSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use settlement::{compute_settlement, SettlementPlan, SettlementStatus};
pub use simplify::simplify;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an expense title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a person's display name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a Venmo/Cash App/Zelle handle.
pub const MAX_PAYMENT_HANDLE_LENGTH: usize = 100;

/// Display color given to people created without one.
pub const DEFAULT_PERSON_COLOR: &str = "#6b7280";

/// Nights assumed for a person on lodging expenses unless overridden.
pub const DEFAULT_NIGHTS: u32 = 1;
