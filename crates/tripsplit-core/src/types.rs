//! # Domain Types
//!
//! Core domain types used throughout tripsplit.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (owned by the persistence layer)                                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Person      │   │     Expense     │   │ ParticipantRef  │       │
//! │  │  id, name       │   │  total_cents    │   │  person_id      │       │
//! │  │  color          │   │  payer_id       │   │  nights (opt)   │       │
//! │  │  payment info   │   │  split_mode     │   └─────────────────┘       │
//! │  └─────────────────┘   │  participants ──┼──► ordered Vec             │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  OUTPUT (derived fresh on every computation)                            │
//! │  ┌──────────────────┐  ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ParticipantShare │  │  PersonBalance  │   │   Transaction   │       │
//! │  │  per expense     │  │  net per person │   │  from → to      │       │
//! │  └──────────────────┘  └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  SettlementRecord = Transaction + sender/receiver confirmation flags   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are plain UUID strings. Amount fields are stored as `i64`
//! cents with [`Money`] accessors for arithmetic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a person prefers to receive money. Pass-through data for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Venmo,
    CashApp,
    Zelle,
}

impl PaymentMethod {
    /// All supported methods, in display order.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Venmo,
        PaymentMethod::CashApp,
        PaymentMethod::Zelle,
    ];

    /// Stored/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Venmo => "venmo",
            PaymentMethod::CashApp => "cashapp",
            PaymentMethod::Zelle => "zelle",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Venmo => "Venmo",
            PaymentMethod::CashApp => "Cash App",
            PaymentMethod::Zelle => "Zelle",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Person
// =============================================================================

/// A trip participant.
///
/// Only `id` matters to the settlement engine. Everything else is carried
/// through for presentation (who to pay, and how).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Display color, `#rrggbb`.
    pub color: String,

    /// Nights pre-filled when the person is added to a lodging expense.
    pub default_nights: i64,

    /// Preferred way to receive money.
    pub payment_method: Option<PaymentMethod>,

    /// Handle for the payment method (e.g. `@alice-w`).
    pub payment_handle: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Expense Category
// =============================================================================

/// What an expense was for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    #[default]
    General,
    Food,
    Lodging,
    Alcohol,
    Transport,
    Activities,
}

impl ExpenseCategory {
    /// All categories, in display order.
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::General,
        ExpenseCategory::Food,
        ExpenseCategory::Lodging,
        ExpenseCategory::Alcohol,
        ExpenseCategory::Transport,
        ExpenseCategory::Activities,
    ];

    /// Stored/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::General => "general",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Lodging => "lodging",
            ExpenseCategory::Alcohol => "alcohol",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Activities => "activities",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::General => "General",
            ExpenseCategory::Food => "Food & Dining",
            ExpenseCategory::Lodging => "Lodging",
            ExpenseCategory::Alcohol => "Alcohol",
            ExpenseCategory::Transport => "Transportation",
            ExpenseCategory::Activities => "Activities",
        }
    }

    /// The split mode a new expense in this category starts with.
    /// Lodging is split by nights, everything else evenly.
    pub const fn default_split_mode(&self) -> SplitMode {
        match self {
            ExpenseCategory::Lodging => SplitMode::Weighted,
            _ => SplitMode::Even,
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: ExpenseCategory::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            })
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Split Mode
// =============================================================================

/// How an expense total is divided among its participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Equal shares; the first `total % n` participants absorb one extra cent.
    #[default]
    Even,
    /// Shares proportional to nights stayed.
    Weighted,
}

impl SplitMode {
    pub const ALL: [SplitMode; 2] = [SplitMode::Even, SplitMode::Weighted];

    /// Stored/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Even => "even",
            SplitMode::Weighted => "weighted",
        }
    }
}

impl FromStr for SplitMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SplitMode::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "split_mode".to_string(),
                allowed: SplitMode::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Expense
// =============================================================================

/// One participant on an expense.
///
/// `nights` is the weight used by [`SplitMode::Weighted`]; it is ignored for
/// even splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRef {
    pub person_id: String,
    pub nights: Option<u32>,
}

impl ParticipantRef {
    /// A participant on an evenly split expense.
    pub fn new(person_id: impl Into<String>) -> Self {
        ParticipantRef {
            person_id: person_id.into(),
            nights: None,
        }
    }

    /// A participant on a lodging expense.
    pub fn with_nights(person_id: impl Into<String>, nights: u32) -> Self {
        ParticipantRef {
            person_id: person_id.into(),
            nights: Some(nights),
        }
    }
}

/// A recorded expense.
///
/// `participants` order is significant: it decides who absorbs remainder
/// cents. The persistence layer keeps it in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[ts(type = "number")]
    pub total_cents: i64,
    pub payer_id: String,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub split_mode: SplitMode,
    pub participants: Vec<ParticipantRef>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Input for recording a new expense. Validated by
/// [`validate_new_expense`](crate::validation::validate_new_expense).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub title: String,
    pub description: Option<String>,
    #[ts(type = "number")]
    pub amount_cents: i64,
    pub payer_id: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    /// Defaults to today when absent.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub split_mode: SplitMode,
    pub participants: Vec<ParticipantRef>,
}

// =============================================================================
// Allocation Output
// =============================================================================

/// One participant's portion of one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub person_id: String,
    #[ts(type = "number")]
    pub amount_cents: i64,
}

impl ParticipantShare {
    pub fn new(person_id: impl Into<String>, amount_cents: i64) -> Self {
        ParticipantShare {
            person_id: person_id.into(),
            amount_cents,
        }
    }

    /// Returns the share as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// An expense after allocation: its shares sum to `total_cents` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithShares {
    pub id: String,
    pub title: String,
    #[ts(type = "number")]
    pub total_cents: i64,
    pub payer_id: String,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub shares: Vec<ParticipantShare>,
}

impl ExpenseWithShares {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// The share assigned to `person_id`, if they took part.
    pub fn share_of(&self, person_id: &str) -> Option<Money> {
        self.shares
            .iter()
            .find(|s| s.person_id == person_id)
            .map(ParticipantShare::amount)
    }
}

// =============================================================================
// Balances and Transactions
// =============================================================================

/// A person's net position across all expenses.
/// Positive = is owed money, negative = owes money, zero = settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PersonBalance {
    pub person_id: String,
    #[ts(type = "number")]
    pub amount_cents: i64,
}

impl PersonBalance {
    pub fn new(person_id: impl Into<String>, amount_cents: i64) -> Self {
        PersonBalance {
            person_id: person_id.into(),
            amount_cents,
        }
    }

    /// Returns the balance as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A directed settling payment: `from` pays `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub from: String,
    pub to: String,
    #[ts(type = "number")]
    pub amount_cents: i64,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount_cents: i64) -> Self {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount_cents,
        }
    }

    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Settlement Records
// =============================================================================

/// A persisted settlement: a [`Transaction`] plus two independent
/// confirmation flags owned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub id: String,
    pub from_person_id: String,
    pub to_person_id: String,
    #[ts(type = "number")]
    pub amount_cents: i64,
    /// The payer says they sent the money.
    pub sender_confirmed: bool,
    /// The recipient says they received it.
    pub receiver_confirmed: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SettlementRecord {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// The payment this record tracks.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(
            self.from_person_id.clone(),
            self.to_person_id.clone(),
            self.amount_cents,
        )
    }
}

/// A settlement joined with both people, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementView {
    #[serde(flatten)]
    pub settlement: SettlementRecord,
    pub from_person: Person,
    pub to_person: Person,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_and_labels() {
        assert_eq!("lodging".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Lodging);
        assert_eq!(" Food ".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Food);
        assert!("groceries".parse::<ExpenseCategory>().is_err());
        assert_eq!(ExpenseCategory::Transport.label(), "Transportation");
        assert_eq!(ExpenseCategory::default(), ExpenseCategory::General);
    }

    #[test]
    fn test_category_default_split_mode() {
        assert_eq!(ExpenseCategory::Lodging.default_split_mode(), SplitMode::Weighted);
        assert_eq!(ExpenseCategory::Food.default_split_mode(), SplitMode::Even);
    }

    #[test]
    fn test_split_mode_parse() {
        assert_eq!("Weighted".parse::<SplitMode>().unwrap(), SplitMode::Weighted);
        assert_eq!("even".parse::<SplitMode>().unwrap(), SplitMode::Even);
        assert!("nights".parse::<SplitMode>().is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cashapp".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashApp);
        assert_eq!("Venmo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Venmo);
        let err = "paypal".parse::<PaymentMethod>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
        assert_eq!(PaymentMethod::CashApp.to_string(), "Cash App");
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let balance = PersonBalance::new("alice", -300);
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json, serde_json::json!({ "personId": "alice", "amountCents": -300 }));

        let method = serde_json::to_value(PaymentMethod::CashApp).unwrap();
        assert_eq!(method, serde_json::json!("cashapp"));
    }

    #[test]
    fn test_share_of() {
        let expense = ExpenseWithShares {
            id: "e1".to_string(),
            title: "Groceries".to_string(),
            total_cents: 1000,
            payer_id: "a".to_string(),
            category: ExpenseCategory::Food,
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            shares: vec![ParticipantShare::new("a", 500), ParticipantShare::new("b", 500)],
        };
        assert_eq!(expense.share_of("b"), Some(Money::from_cents(500)));
        assert_eq!(expense.share_of("c"), None);
    }
}
