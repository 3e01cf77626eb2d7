//! # Validation Module
//!
//! Input validation for records entering the settlement engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (web UI / CLI)                                     │
//! │  ├── Basic format checks (empty, dollar parsing)                       │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Persistence collaborator (tripsplit-db)                      │
//! │  └── THIS MODULE: validate_new_expense before any row is written       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (amount >= 1, nights >= 1)                      │
//! │  ├── UNIQUE (expense_id, person_id)                                    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tripsplit_core::validation::{validate_amount_cents, validate_title};
//!
//! assert!(validate_title("Cabin deposit").is_ok());
//! assert!(validate_amount_cents(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{NewExpense, ParticipantRef, SplitMode};
use crate::{MAX_NAME_LENGTH, MAX_PAYMENT_HANDLE_LENGTH, MAX_TITLE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an expense title.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LENGTH,
        });
    }

    Ok(())
}

/// Validates a person's display name.
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a display color in `#rrggbb` form.
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_color;
///
/// assert!(validate_color("#e07a5f").is_ok());
/// assert!(validate_color("red").is_err());
/// ```
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let hex = color.strip_prefix('#').unwrap_or("");

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidFormat {
            field: "color".to_string(),
            reason: "must look like #rrggbb".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a payment handle.
///
/// ## Returns
/// The trimmed handle, or `None` when blank (clears the handle).
pub fn validate_payment_handle(handle: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(handle) = handle.map(str::trim).filter(|h| !h.is_empty()) else {
        return Ok(None);
    };

    if handle.chars().count() > MAX_PAYMENT_HANDLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "payment_handle".to_string(),
            max: MAX_PAYMENT_HANDLE_LENGTH,
        });
    }

    Ok(Some(handle.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an expense amount in cents.
///
/// ## Rules
/// - At least one cent. Zero and negative expenses are not supported.
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents < 1 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates nights for one participant on a weighted (lodging) expense.
pub fn validate_nights(person_id: &str, nights: Option<u32>) -> ValidationResult<u32> {
    match nights {
        Some(n) if n >= 1 => Ok(n),
        _ => Err(ValidationError::MustBePositive {
            field: format!("nights for {person_id}"),
        }),
    }
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the participant list of an expense.
///
/// ## Rules
/// - At least one participant
/// - No person listed twice
/// - Weighted splits: everyone has nights >= 1
pub fn validate_participants(
    participants: &[ParticipantRef],
    mode: SplitMode,
) -> ValidationResult<()> {
    if participants.is_empty() {
        return Err(ValidationError::Required {
            field: "participants".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if participant.person_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "participant id".to_string(),
            });
        }
        if !seen.insert(participant.person_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "participant".to_string(),
                value: participant.person_id.clone(),
            });
        }
        if mode == SplitMode::Weighted {
            validate_nights(&participant.person_id, participant.nights)?;
        }
    }

    Ok(())
}

/// Validates a new expense before it is persisted.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Add Expense                                                            │
/// │                                                                         │
/// │  validate_new_expense(&input) ← THIS FUNCTION                          │
/// │       │                                                                 │
/// │       ├── blank title?            → "title is required"                │
/// │       ├── amount < 1 cent?        → "amount must be positive"          │
/// │       ├── no payer?               → "payer is required"                │
/// │       ├── no participants?        → "participants is required"         │
/// │       ├── lodging, nights < 1?    → "nights for <id> must be positive" │
/// │       │                                                                 │
/// │       └── OK → insert expense + participants in one transaction        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_new_expense(expense: &NewExpense) -> ValidationResult<()> {
    validate_title(&expense.title)?;
    validate_amount_cents(expense.amount_cents)?;

    if expense.payer_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payer".to_string(),
        });
    }

    validate_participants(&expense.participants, expense.split_mode)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use tripsplit_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
