//! # Share Allocation
//!
//! Splits one expense's total among its participants.
//!
//! ## Split Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EVEN                                                                   │
//! │    base = total / n, remainder = total % n                              │
//! │    participants[0..remainder] get base + 1, the rest get base          │
//! │                                                                         │
//! │    $10.00 over [A, B, C]  →  A: 334  B: 333  C: 333                    │
//! │                                                                         │
//! │  WEIGHTED (nights)                                                      │
//! │    raw_i = round(total × nights_i / Σ nights)   (half away from zero)  │
//! │    participants[0] += total − Σ raw_i                                  │
//! │                                                                         │
//! │    $900.00 over [A: 2 nights, B: 1 night]  →  A: 600  B: 300           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either way the shares sum to the total exactly. Who absorbs leftover
//! cents is decided by position in the caller's participant list, so the
//! caller must pass a stable order (the persisted insertion order).

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Expense, ExpenseWithShares, ParticipantRef, ParticipantShare, SplitMode};
use crate::validation::validate_nights;

/// Splits `total` among `participants`.
///
/// The payer does not influence the amounts: their own share is computed
/// like everyone else's. Netting out what the payer fronted happens in
/// [`aggregate`](crate::balance::aggregate).
///
/// ## Errors
/// [`CoreError::InvalidInput`] when the total is below one cent, the list
/// is empty, a person appears twice, or (weighted mode) someone has no
/// nights.
///
/// ## Example
/// ```rust
/// use tripsplit_core::allocation::allocate;
/// use tripsplit_core::{Money, ParticipantRef, SplitMode};
///
/// let people = [ParticipantRef::new("a"), ParticipantRef::new("b"), ParticipantRef::new("c")];
/// let shares = allocate(Money::from_cents(1000), &people, SplitMode::Even).unwrap();
///
/// let amounts: Vec<i64> = shares.iter().map(|s| s.amount_cents).collect();
/// assert_eq!(amounts, vec![334, 333, 333]);
/// ```
pub fn allocate(
    total: Money,
    participants: &[ParticipantRef],
    mode: SplitMode,
) -> CoreResult<Vec<ParticipantShare>> {
    if !total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    if participants.is_empty() {
        return Err(ValidationError::Required {
            field: "participants".to_string(),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(participants.len());
    if let Some(dup) = participants.iter().find(|p| !seen.insert(p.person_id.as_str())) {
        return Err(ValidationError::Duplicate {
            field: "participant".to_string(),
            value: dup.person_id.clone(),
        }
        .into());
    }

    match mode {
        SplitMode::Even => Ok(split_evenly(total, participants)),
        SplitMode::Weighted => split_by_nights(total, participants),
    }
}

/// Allocates a recorded expense using its own split mode.
pub fn allocate_expense(expense: &Expense) -> CoreResult<ExpenseWithShares> {
    let shares = allocate(expense.total(), &expense.participants, expense.split_mode)?;

    Ok(ExpenseWithShares {
        id: expense.id.clone(),
        title: expense.title.clone(),
        total_cents: expense.total_cents,
        payer_id: expense.payer_id.clone(),
        category: expense.category,
        date: expense.date,
        shares,
    })
}

/// Checks that an already-allocated expense still sums to its total.
///
/// For callers that hand [`aggregate`](crate::balance::aggregate) shares
/// they did not compute themselves.
pub fn verify_shares(expense: &ExpenseWithShares) -> CoreResult<()> {
    let actual: Money = expense.shares.iter().map(ParticipantShare::amount).sum();

    if actual != expense.total() {
        return Err(CoreError::ShareMismatch {
            expense_id: expense.id.clone(),
            expected_cents: expense.total_cents,
            actual_cents: actual.cents(),
        });
    }

    Ok(())
}

fn split_evenly(total: Money, participants: &[ParticipantRef]) -> Vec<ParticipantShare> {
    let count = participants.len() as i64;
    let base = total.cents() / count;
    let remainder = total.cents() % count;

    participants
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let extra = i64::from((index as i64) < remainder);
            ParticipantShare::new(p.person_id.clone(), base + extra)
        })
        .collect()
}

fn split_by_nights(total: Money, participants: &[ParticipantRef]) -> CoreResult<Vec<ParticipantShare>> {
    let nights = participants
        .iter()
        .map(|p| validate_nights(&p.person_id, p.nights).map(i128::from))
        .collect::<Result<Vec<_>, _>>()?;

    let total_nights: i128 = nights.iter().sum();
    let total_cents = i128::from(total.cents());

    let mut amounts = nights
        .iter()
        .map(|&n| rounded_share(total_cents, n, total_nights))
        .collect::<CoreResult<Vec<i64>>>()?;

    // The whole rounding error lands on the first participant.
    let allocated: i64 = amounts.iter().sum();
    amounts[0] += total.cents() - allocated;

    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(p, amount)| ParticipantShare::new(p.person_id.clone(), amount))
        .collect())
}

/// `round(total × nights / total_nights)`, rounding halves away from zero.
///
/// Integer-only: `(2·total·nights + total_nights) / (2·total_nights)` is
/// `floor(x + ½)`, which matches half-away-from-zero for positive `x`.
fn rounded_share(total_cents: i128, nights: i128, total_nights: i128) -> CoreResult<i64> {
    let cents = (2 * total_cents * nights + total_nights) / (2 * total_nights);
    i64::try_from(cents).map_err(|_| CoreError::AmountOverflow)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpenseCategory;
    use chrono::{NaiveDate, Utc};

    fn even(ids: &[&str]) -> Vec<ParticipantRef> {
        ids.iter().map(|id| ParticipantRef::new(*id)).collect()
    }

    fn weighted(entries: &[(&str, u32)]) -> Vec<ParticipantRef> {
        entries
            .iter()
            .map(|(id, n)| ParticipantRef::with_nights(*id, *n))
            .collect()
    }

    fn amounts(shares: &[ParticipantShare]) -> Vec<i64> {
        shares.iter().map(|s| s.amount_cents).collect()
    }

    #[test]
    fn test_even_split_remainder_goes_to_first() {
        let shares = allocate(Money::from_cents(1000), &even(&["a", "b", "c"]), SplitMode::Even).unwrap();
        assert_eq!(amounts(&shares), vec![334, 333, 333]);
        assert_eq!(shares[0].person_id, "a");
    }

    #[test]
    fn test_even_split_two_remainder_cents() {
        let shares = allocate(Money::from_cents(1001), &even(&["c", "a", "b"]), SplitMode::Even).unwrap();
        assert_eq!(amounts(&shares), vec![334, 334, 333]);
        assert_eq!(shares[0].person_id, "c");
        assert_eq!(shares[1].person_id, "a");
    }

    #[test]
    fn test_even_split_fewer_cents_than_people() {
        let shares = allocate(Money::from_cents(2), &even(&["a", "b", "c", "d"]), SplitMode::Even).unwrap();
        assert_eq!(amounts(&shares), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_even_split_is_deterministic() {
        let people = even(&["x", "y", "z", "w"]);
        let first = allocate(Money::from_cents(12_347), &people, SplitMode::Even).unwrap();
        let second = allocate(Money::from_cents(12_347), &people, SplitMode::Even).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_weighted_lodging_example() {
        let shares = allocate(
            Money::from_cents(900),
            &weighted(&[("a", 2), ("b", 1)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![600, 300]);
    }

    #[test]
    fn test_weighted_rounding_error_absorbed_by_first() {
        // 1000 / 3 nights = 333.33 per night → raw [333, 333, 333], error +1
        let shares = allocate(
            Money::from_cents(1000),
            &weighted(&[("a", 1), ("b", 1), ("c", 1)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![334, 333, 333]);

        // 1000 over nights [1, 2]: raw [333, 667] sums exactly, no correction
        let shares = allocate(
            Money::from_cents(1000),
            &weighted(&[("a", 1), ("b", 2)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![333, 667]);
    }

    #[test]
    fn test_weighted_half_rounds_away_from_zero() {
        // 5 cents over 2 equal nights: 2.5 → 3 each, error −1 on first
        let shares = allocate(
            Money::from_cents(5),
            &weighted(&[("a", 1), ("b", 1)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![2, 3]);
    }

    #[test]
    fn test_weighted_tiny_total_drives_first_share_negative() {
        // 2 cents over 4 equal nights: 0.5 → 1 each, error −2 on first
        let shares = allocate(
            Money::from_cents(2),
            &weighted(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![-1, 1, 1, 1]);

        // The ledger still balances end to end
        let expense = ExpenseWithShares {
            id: "e1".to_string(),
            title: "Towels".to_string(),
            total_cents: 2,
            payer_id: "a".to_string(),
            category: ExpenseCategory::Lodging,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            shares,
        };
        assert!(verify_shares(&expense).is_ok());

        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let balances = crate::balance::aggregate(std::slice::from_ref(&expense), &ids);
        let nets: Vec<i64> = balances.iter().map(|b| b.amount_cents).collect();
        assert_eq!(nets, vec![3, -1, -1, -1]);

        let payments = crate::simplify::simplify(&balances).unwrap();
        assert_eq!(payments.len(), 3);
        assert!(payments.iter().all(|t| t.to == "a" && t.amount_cents == 1));
    }

    #[test]
    fn test_weighted_double_nights_double_share() {
        let shares = allocate(
            Money::from_cents(40_000),
            &weighted(&[("a", 1), ("b", 2), ("c", 1)]),
            SplitMode::Weighted,
        )
        .unwrap();
        assert_eq!(amounts(&shares), vec![10_000, 20_000, 10_000]);
    }

    #[test]
    fn test_shares_always_sum_to_total() {
        let nights = [3u32, 1, 4, 1, 5, 9, 2, 6];
        for total in [1i64, 2, 7, 99, 100, 101, 1000, 12_345, 99_999, 1_000_003] {
            for n in 1..=nights.len() {
                let ids: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
                let even_refs: Vec<ParticipantRef> = ids.iter().map(ParticipantRef::new).collect();
                let weighted_refs: Vec<ParticipantRef> = ids
                    .iter()
                    .zip(nights)
                    .map(|(id, nights)| ParticipantRef::with_nights(id.clone(), nights))
                    .collect();

                for (refs, mode) in [(&even_refs, SplitMode::Even), (&weighted_refs, SplitMode::Weighted)] {
                    let shares = allocate(Money::from_cents(total), refs, mode).unwrap();
                    assert_eq!(shares.len(), n);
                    let sum: i64 = shares.iter().map(|s| s.amount_cents).sum();
                    assert_eq!(sum, total, "total={total} n={n} mode={mode:?}");
                }
            }
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        let people = even(&["a"]);
        assert!(matches!(
            allocate(Money::zero(), &people, SplitMode::Even),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            allocate(Money::from_cents(-100), &people, SplitMode::Even),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            allocate(Money::from_cents(100), &[], SplitMode::Even),
            Err(CoreError::InvalidInput(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            allocate(Money::from_cents(100), &even(&["a", "a"]), SplitMode::Even),
            Err(CoreError::InvalidInput(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_weighted_rejects_missing_or_zero_nights() {
        let zero = weighted(&[("a", 2), ("b", 0)]);
        assert!(matches!(
            allocate(Money::from_cents(100), &zero, SplitMode::Weighted),
            Err(CoreError::InvalidInput(ValidationError::MustBePositive { .. }))
        ));

        let missing = vec![ParticipantRef::with_nights("a", 2), ParticipantRef::new("b")];
        assert!(allocate(Money::from_cents(100), &missing, SplitMode::Weighted).is_err());
    }

    #[test]
    fn test_allocate_expense_uses_split_mode() {
        let expense = Expense {
            id: "e1".to_string(),
            title: "Cabin".to_string(),
            description: None,
            total_cents: 900,
            payer_id: "a".to_string(),
            category: ExpenseCategory::Lodging,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            split_mode: SplitMode::Weighted,
            participants: weighted(&[("a", 2), ("b", 1)]),
            created_at: Utc::now(),
        };

        let allocated = allocate_expense(&expense).unwrap();
        assert_eq!(allocated.payer_id, "a");
        assert_eq!(amounts(&allocated.shares), vec![600, 300]);
        assert!(verify_shares(&allocated).is_ok());
    }

    #[test]
    fn test_verify_shares_detects_mismatch() {
        let expense = ExpenseWithShares {
            id: "e1".to_string(),
            title: "Dinner".to_string(),
            total_cents: 1000,
            payer_id: "a".to_string(),
            category: ExpenseCategory::Food,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            shares: vec![ParticipantShare::new("a", 333), ParticipantShare::new("b", 333)],
        };
        assert!(matches!(
            verify_shares(&expense),
            Err(CoreError::ShareMismatch { actual_cents: 666, .. })
        ));
    }
}
