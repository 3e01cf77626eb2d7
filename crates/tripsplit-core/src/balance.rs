//! # Balance Aggregation
//!
//! Folds allocated expenses into one net balance per person.
//!
//! ## Netting Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each expense, for each share where participant ≠ payer:           │
//! │                                                                         │
//! │      balance[participant] −= share                                      │
//! │      balance[payer]       += share                                      │
//! │                                                                         │
//! │  The payer's own share moves nothing: nobody owes themselves.          │
//! │  Only what the payer fronted for others becomes a claim.               │
//! │                                                                         │
//! │  Every credit has a matching debit, so Σ balances == 0 always.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ExpenseCategory, ExpenseWithShares, PersonBalance};

/// Nets all expenses into one balance per person.
///
/// Every id in `person_ids` gets an entry, even with no expenses (balance
/// 0). Payers or participants missing from `person_ids` are still credited
/// or debited and appended after the known people, in first-seen order.
/// Known people keep the order of `person_ids`; duplicates are ignored.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tripsplit_core::balance::aggregate;
/// use tripsplit_core::{ExpenseCategory, ExpenseWithShares, ParticipantShare};
///
/// let dinner = ExpenseWithShares {
///     id: "e1".into(),
///     title: "Dinner".into(),
///     total_cents: 1000,
///     payer_id: "a".into(),
///     category: ExpenseCategory::Food,
///     date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
///     shares: vec![
///         ParticipantShare::new("a", 334),
///         ParticipantShare::new("b", 333),
///         ParticipantShare::new("c", 333),
///     ],
/// };
///
/// let ids = ["a".to_string(), "b".to_string(), "c".to_string()];
/// let balances = aggregate(&[dinner], &ids);
/// let amounts: Vec<i64> = balances.iter().map(|b| b.amount_cents).collect();
/// assert_eq!(amounts, vec![666, -333, -333]);
/// ```
pub fn aggregate(expenses: &[ExpenseWithShares], person_ids: &[String]) -> Vec<PersonBalance> {
    let mut ledger = Ledger::with_people(person_ids);

    for expense in expenses {
        for share in &expense.shares {
            if share.person_id == expense.payer_id {
                continue;
            }
            ledger.adjust(&share.person_id, -share.amount_cents);
            ledger.adjust(&expense.payer_id, share.amount_cents);
        }
    }

    ledger.into_balances()
}

/// Insertion-ordered accumulator keyed by person id.
struct Ledger {
    index: HashMap<String, usize>,
    entries: Vec<PersonBalance>,
}

impl Ledger {
    fn with_people(person_ids: &[String]) -> Self {
        let mut ledger = Ledger {
            index: HashMap::with_capacity(person_ids.len()),
            entries: Vec::with_capacity(person_ids.len()),
        };
        for id in person_ids {
            ledger.slot(id);
        }
        ledger
    }

    fn slot(&mut self, person_id: &str) -> &mut PersonBalance {
        let position = match self.index.get(person_id) {
            Some(&position) => position,
            None => {
                self.entries.push(PersonBalance::new(person_id, 0));
                self.index.insert(person_id.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[position]
    }

    fn adjust(&mut self, person_id: &str, delta_cents: i64) {
        self.slot(person_id).amount_cents += delta_cents;
    }

    fn into_balances(self) -> Vec<PersonBalance> {
        self.entries
    }
}

// =============================================================================
// Per-Person Summary
// =============================================================================

/// What one person fronted versus what they consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    /// Sum of totals of expenses this person paid for.
    pub total_paid: Money,
    /// Sum of this person's shares across all expenses.
    pub total_share: Money,
}

impl PersonSummary {
    /// `total_paid − total_share`. Equals the person's aggregated balance.
    pub fn net(&self) -> Money {
        self.total_paid - self.total_share
    }
}

/// Summarizes one person's paid and consumed totals.
pub fn person_summary(person_id: &str, expenses: &[ExpenseWithShares]) -> PersonSummary {
    let total_paid = expenses
        .iter()
        .filter(|e| e.payer_id == person_id)
        .map(ExpenseWithShares::total)
        .sum();
    let total_share = expenses.iter().filter_map(|e| e.share_of(person_id)).sum();

    PersonSummary {
        total_paid,
        total_share,
    }
}

/// Expenses a person paid for or took part in, grouped by category.
/// Categories iterate in [`ExpenseCategory`] declaration order.
pub fn expenses_by_category<'a>(
    person_id: &str,
    expenses: &'a [ExpenseWithShares],
) -> BTreeMap<ExpenseCategory, Vec<&'a ExpenseWithShares>> {
    let mut grouped: BTreeMap<ExpenseCategory, Vec<&ExpenseWithShares>> = BTreeMap::new();

    for expense in expenses {
        let involved = expense.payer_id == person_id || expense.share_of(person_id).is_some();
        if involved {
            grouped.entry(expense.category).or_default().push(expense);
        }
    }

    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================
