//! # Settlement
//!
//! The full pipeline from recorded expenses to payments, plus the status
//! classifier for persisted settlements.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Expense[] ──► allocate_expense ──► ExpenseWithShares[]                 │
//! │                                          │                              │
//! │  person ids ─────────────────────────────┤                              │
//! │                                          ▼                              │
//! │                                      aggregate ──► PersonBalance[]      │
//! │                                                          │              │
//! │                                                          ▼              │
//! │                                                      simplify           │
//! │                                                          │              │
//! │                                                          ▼              │
//! │                                                   Transaction[]         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Confirmation Lifecycle
//! ```text
//!   sender_confirmed  receiver_confirmed     status
//!   ────────────────  ──────────────────     ───────
//!        false              false            Pending
//!        true               false            Partial
//!        false              true             Partial
//!        true               true             Settled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::allocation::{allocate_expense, verify_shares};
use crate::balance::aggregate;
use crate::error::CoreResult;
use crate::simplify::simplify;
use crate::types::{Expense, ExpenseWithShares, PersonBalance, SettlementRecord, Transaction};

// =============================================================================
// Settlement Status
// =============================================================================

/// Payment state derived from the two confirmation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Neither side has confirmed.
    Pending,
    /// Exactly one side has confirmed.
    Partial,
    /// Both sides have confirmed.
    Settled,
}

impl SettlementStatus {
    /// Classifies a pair of confirmation flags.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::SettlementStatus;
    ///
    /// assert_eq!(SettlementStatus::from_flags(true, true), SettlementStatus::Settled);
    /// assert_eq!(SettlementStatus::from_flags(false, true), SettlementStatus::Partial);
    /// ```
    pub const fn from_flags(sender_confirmed: bool, receiver_confirmed: bool) -> Self {
        match (sender_confirmed, receiver_confirmed) {
            (true, true) => SettlementStatus::Settled,
            (false, false) => SettlementStatus::Pending,
            _ => SettlementStatus::Partial,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Partial => "partial",
            SettlementStatus::Settled => "settled",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "Pending",
            SettlementStatus::Partial => "Partially confirmed",
            SettlementStatus::Settled => "Settled",
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SettlementRecord {
    /// Current status from this record's confirmation flags.
    pub fn status(&self) -> SettlementStatus {
        SettlementStatus::from_flags(self.sender_confirmed, self.receiver_confirmed)
    }
}

// =============================================================================
// Settlement Plan
// =============================================================================

/// Everything derived from one snapshot of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPlan {
    /// Every expense with its per-participant shares.
    pub expenses: Vec<ExpenseWithShares>,
    /// One net balance per person.
    pub balances: Vec<PersonBalance>,
    /// Payments that settle all balances.
    pub transactions: Vec<Transaction>,
}

/// Runs allocation, aggregation and simplification over a ledger snapshot.
///
/// `expenses` must carry participants in their persisted order; that order
/// decides who absorbs leftover cents.
///
/// ## Errors
/// [`CoreError::InvalidInput`](crate::CoreError::InvalidInput) for any
/// malformed expense. The whole computation fails; nothing is skipped.
pub fn compute_settlement(expenses: &[Expense], person_ids: &[String]) -> CoreResult<SettlementPlan> {
    let allocated = expenses
        .iter()
        .map(|expense| -> CoreResult<ExpenseWithShares> {
            let with_shares = allocate_expense(expense)?;
            verify_shares(&with_shares)?;
            Ok(with_shares)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let balances = aggregate(&allocated, person_ids);
    let transactions = simplify(&balances)?;

    debug!(
        expenses = allocated.len(),
        people = balances.len(),
        transactions = transactions.len(),
        "Computed settlement plan"
    );

    Ok(SettlementPlan {
        expenses: allocated,
        balances,
        transactions,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{ExpenseCategory, ParticipantRef, SplitMode};
    use chrono::{NaiveDate, Utc};

    fn expense(
        id: &str,
        total_cents: i64,
        payer: &str,
        category: ExpenseCategory,
        split_mode: SplitMode,
        participants: Vec<ParticipantRef>,
    ) -> Expense {
        Expense {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            total_cents,
            payer_id: payer.to_string(),
            category,
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            split_mode,
            participants,
            created_at: Utc::now(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_status_from_flags() {
        assert_eq!(SettlementStatus::from_flags(true, true), SettlementStatus::Settled);
        assert_eq!(SettlementStatus::from_flags(true, false), SettlementStatus::Partial);
        assert_eq!(SettlementStatus::from_flags(false, true), SettlementStatus::Partial);
        assert_eq!(SettlementStatus::from_flags(false, false), SettlementStatus::Pending);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SettlementStatus::Partial).unwrap();
        assert_eq!(json, "\"partial\"");
        assert_eq!(SettlementStatus::Settled.to_string(), "settled");
    }

    #[test]
    fn test_record_status() {
        let mut record = SettlementRecord {
            id: "s1".to_string(),
            from_person_id: "b".to_string(),
            to_person_id: "a".to_string(),
            amount_cents: 300,
            sender_confirmed: false,
            receiver_confirmed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.status(), SettlementStatus::Pending);

        record.receiver_confirmed = true;
        assert_eq!(record.status(), SettlementStatus::Partial);

        record.sender_confirmed = true;
        assert_eq!(record.status(), SettlementStatus::Settled);
    }

    #[test]
    fn test_weekend_trip() {
        let expenses = vec![
            expense(
                "cabin",
                90_000,
                "a",
                ExpenseCategory::Lodging,
                SplitMode::Weighted,
                vec![ParticipantRef::with_nights("a", 2), ParticipantRef::with_nights("b", 1)],
            ),
            expense(
                "dinner",
                1000,
                "c",
                ExpenseCategory::Food,
                SplitMode::Even,
                vec![ParticipantRef::new("a"), ParticipantRef::new("b"), ParticipantRef::new("c")],
            ),
        ];

        let plan = compute_settlement(&expenses, &ids(&["a", "b", "c"])).unwrap();

        // cabin: a 60000, b 30000; dinner: a 334, b 333, c 333
        let amounts: Vec<(&str, i64)> = plan
            .balances
            .iter()
            .map(|b| (b.person_id.as_str(), b.amount_cents))
            .collect();
        assert_eq!(amounts, vec![("a", 29_666), ("b", -30_333), ("c", 667)]);

        let payments: Vec<(&str, &str, i64)> = plan
            .transactions
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str(), t.amount_cents))
            .collect();
        assert_eq!(payments, vec![("b", "a", 29_666), ("b", "c", 667)]);
    }

    #[test]
    fn test_nothing_recorded_means_nothing_owed() {
        let plan = compute_settlement(&[], &ids(&["a", "b"])).unwrap();
        assert_eq!(plan.balances.len(), 2);
        assert!(plan.transactions.is_empty());
    }

    #[test]
    fn test_one_bad_expense_fails_the_whole_plan() {
        let expenses = vec![
            expense(
                "ok",
                500,
                "a",
                ExpenseCategory::General,
                SplitMode::Even,
                vec![ParticipantRef::new("a"), ParticipantRef::new("b")],
            ),
            expense(
                "cabin",
                90_000,
                "a",
                ExpenseCategory::Lodging,
                SplitMode::Weighted,
                vec![ParticipantRef::with_nights("a", 2), ParticipantRef::new("b")],
            ),
        ];

        let err = compute_settlement(&expenses, &ids(&["a", "b"])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
