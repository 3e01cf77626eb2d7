//! # Debt Simplification
//!
//! Turns net balances into a short list of direct payments.
//!
//! ## Greedy Largest-First Matching
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balances:  A +500   B −300   C −200                                    │
//! │                                                                         │
//! │  creditors (desc):  A 500                                               │
//! │  debtors   (desc):  B 300, C 200                                        │
//! │                                                                         │
//! │  step 1: min(B 300, A 500) = 300   →  B pays A $3.00                    │
//! │  step 2: min(C 200, A 200) = 200   →  C pays A $2.00                    │
//! │                                                                         │
//! │  Both lists sorted by amount, largest first. Equal amounts keep their  │
//! │  input order (stable sort). Zero balances are dropped up front.        │
//! │  At most |creditors| + |debtors| − 1 payments are emitted.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The heuristic is not minimal for every tie pattern. Output is fully
//! determined by the input order, which keeps stored settlements stable
//! between recalculations of the same ledger.

use crate::error::{CoreError, CoreResult};
use crate::types::{PersonBalance, Transaction};

/// One side of the matching, with what is left to pay or receive.
struct Position<'a> {
    person_id: &'a str,
    remaining: u64,
}

/// Produces the payments that settle every balance.
///
/// ## Errors
/// [`CoreError::DataIntegrityViolation`] when the balances do not sum to
/// zero. No partial settlement is produced in that case.
///
/// ## Example
/// ```rust
/// use tripsplit_core::simplify::simplify;
/// use tripsplit_core::PersonBalance;
///
/// let balances = [
///     PersonBalance::new("a", 500),
///     PersonBalance::new("b", -300),
///     PersonBalance::new("c", -200),
/// ];
/// let payments = simplify(&balances).unwrap();
///
/// assert_eq!(payments.len(), 2);
/// assert_eq!((payments[0].from.as_str(), payments[0].amount_cents), ("b", 300));
/// assert_eq!((payments[1].from.as_str(), payments[1].amount_cents), ("c", 200));
/// ```
pub fn simplify(balances: &[PersonBalance]) -> CoreResult<Vec<Transaction>> {
    let net: i128 = balances.iter().map(|b| i128::from(b.amount_cents)).sum();
    if net != 0 {
        let net_cents = i64::try_from(net).map_err(|_| CoreError::AmountOverflow)?;
        return Err(CoreError::DataIntegrityViolation { net_cents });
    }

    let mut creditors: Vec<Position> = balances
        .iter()
        .filter(|b| b.amount_cents > 0)
        .map(|b| Position {
            person_id: &b.person_id,
            remaining: b.amount_cents.unsigned_abs(),
        })
        .collect();
    let mut debtors: Vec<Position> = balances
        .iter()
        .filter(|b| b.amount_cents < 0)
        .map(|b| Position {
            person_id: &b.person_id,
            remaining: b.amount_cents.unsigned_abs(),
        })
        .collect();

    // sort_by is stable: equal amounts stay in input order
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut transactions = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].remaining.min(creditors[j].remaining);
        let amount_cents = i64::try_from(amount).map_err(|_| CoreError::AmountOverflow)?;

        transactions.push(Transaction::new(
            debtors[i].person_id,
            creditors[j].person_id,
            amount_cents,
        ));

        debtors[i].remaining -= amount;
        creditors[j].remaining -= amount;

        if debtors[i].remaining == 0 {
            i += 1;
        }
        if creditors[j].remaining == 0 {
            j += 1;
        }
    }

    Ok(transactions)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn balances(list: &[(&str, i64)]) -> Vec<PersonBalance> {
        list.iter().map(|(id, c)| PersonBalance::new(*id, *c)).collect()
    }

    fn pairs(transactions: &[Transaction]) -> Vec<(&str, &str, i64)> {
        transactions
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str(), t.amount_cents))
            .collect()
    }

    /// Applies payments to balances; a settled ledger nets to all zeros.
    fn apply(balances: &[PersonBalance], transactions: &[Transaction]) -> HashMap<String, i64> {
        let mut net: HashMap<String, i64> = balances
            .iter()
            .map(|b| (b.person_id.clone(), b.amount_cents))
            .collect();
        for t in transactions {
            *net.entry(t.from.clone()).or_default() += t.amount_cents;
            *net.entry(t.to.clone()).or_default() -= t.amount_cents;
        }
        net
    }

    #[test]
    fn test_one_creditor_two_debtors() {
        let input = balances(&[("a", 500), ("b", -300), ("c", -200)]);
        let result = simplify(&input).unwrap();
        assert_eq!(pairs(&result), vec![("b", "a", 300), ("c", "a", 200)]);
    }

    #[test]
    fn test_largest_amounts_matched_first() {
        let input = balances(&[("b", 200), ("d", -500), ("a", 1000), ("c", -700)]);
        let result = simplify(&input).unwrap();
        assert_eq!(
            pairs(&result),
            vec![("c", "a", 700), ("d", "a", 300), ("d", "b", 200)]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = balances(&[("a", 300), ("b", 300), ("c", -300), ("d", -300)]);
        let result = simplify(&input).unwrap();
        assert_eq!(pairs(&result), vec![("c", "a", 300), ("d", "b", 300)]);

        let swapped = balances(&[("b", 300), ("a", 300), ("d", -300), ("c", -300)]);
        let result = simplify(&swapped).unwrap();
        assert_eq!(pairs(&result), vec![("d", "b", 300), ("c", "a", 300)]);
    }

    #[test]
    fn test_empty_and_all_zero() {
        assert!(simplify(&[]).unwrap().is_empty());
        assert!(simplify(&balances(&[("a", 0), ("b", 0)])).unwrap().is_empty());
    }

    #[test]
    fn test_unbalanced_input_is_refused() {
        let err = simplify(&balances(&[("a", 500)])).unwrap_err();
        assert!(matches!(err, CoreError::DataIntegrityViolation { net_cents: 500 }));

        let err = simplify(&balances(&[("a", 100), ("b", -101)])).unwrap_err();
        assert!(matches!(err, CoreError::DataIntegrityViolation { net_cents: -1 }));
    }

    #[test]
    fn test_settles_everyone_within_transaction_bound() {
        // Deterministic pseudo-random ledgers
        let mut seed: u64 = 0x5eed;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 20_001) as i64 - 10_000
        };

        for size in 2..12 {
            let mut input: Vec<PersonBalance> = (0..size - 1)
                .map(|i| PersonBalance::new(format!("p{i}"), next()))
                .collect();
            let rest: i64 = input.iter().map(|b| b.amount_cents).sum();
            input.push(PersonBalance::new("last", -rest));

            let result = simplify(&input).unwrap();

            assert!(apply(&input, &result).values().all(|&v| v == 0));
            assert!(result.iter().all(|t| t.amount_cents > 0));

            let nonzero = input.iter().filter(|b| b.amount_cents != 0).count();
            assert!(result.len() <= nonzero.saturating_sub(1));
        }
    }
}
