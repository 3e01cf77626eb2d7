//! # Sample Trip Seeding
//!
//! Populates an empty database with a small lake-house weekend for
//! development and demos.
//!
//! ## Generated Data
//! - Four people, two with payment handles
//! - A lodging expense split by nights (one person stays a night less)
//! - Groceries, a dinner out, gas and kayak rentals split evenly
//! - A fresh settlement set computed from the above

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use tripsplit_core::{ExpenseCategory, NewExpense, ParticipantRef, PaymentMethod, SplitMode};

/// People in the sample trip: (name, color, nights, payment method, handle).
const PEOPLE: &[(&str, &str, u32, Option<PaymentMethod>, Option<&str>)] = &[
    ("Ana", "#e07a5f", 3, Some(PaymentMethod::Venmo), Some("@ana-m")),
    ("Bo", "#3d405b", 3, Some(PaymentMethod::Zelle), Some("bo@example.com")),
    ("Cleo", "#81b29a", 2, None, None),
    ("Dev", "#f2cc8f", 3, None, None),
];

/// What the seeder created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub people: usize,
    pub expenses: usize,
    pub settlements: usize,
}

/// Seeds the sample trip.
///
/// ## Errors
/// Refuses to touch a database that already has people, so real trip
/// data is never mixed with sample data.
pub async fn seed_sample_trip(db: &Database) -> DbResult<SeedSummary> {
    let existing = db.people().count().await?;
    if existing > 0 {
        return Err(DbError::duplicate("people", format!("{existing} existing")));
    }

    let mut ids = Vec::with_capacity(PEOPLE.len());
    for (name, color, nights, method, handle) in PEOPLE {
        let person = db.people().create(name, Some(*color), *nights).await?;
        if method.is_some() {
            db.people()
                .update_payment_info(&person.id, *method, *handle)
                .await?;
        }
        ids.push((person.id, *nights));
    }

    let everyone = || -> Vec<ParticipantRef> {
        ids.iter().map(|(id, _)| ParticipantRef::new(id.clone())).collect()
    };
    let date = |day| NaiveDate::from_ymd_opt(2025, 7, day);

    let expenses = vec![
        NewExpense {
            title: "Lake house".to_string(),
            description: Some("Three nights, Cleo arrives Saturday".to_string()),
            amount_cents: 132_000,
            payer_id: ids[0].0.clone(),
            category: ExpenseCategory::Lodging,
            date: date(3),
            split_mode: SplitMode::Weighted,
            participants: ids
                .iter()
                .map(|(id, nights)| ParticipantRef::with_nights(id.clone(), *nights))
                .collect(),
        },
        NewExpense {
            title: "Groceries".to_string(),
            description: None,
            amount_cents: 18_743,
            payer_id: ids[1].0.clone(),
            category: ExpenseCategory::Food,
            date: date(3),
            split_mode: SplitMode::Even,
            participants: everyone(),
        },
        NewExpense {
            title: "Dinner at the marina".to_string(),
            description: None,
            amount_cents: 24_610,
            payer_id: ids[2].0.clone(),
            category: ExpenseCategory::Food,
            date: date(4),
            split_mode: SplitMode::Even,
            participants: everyone(),
        },
        NewExpense {
            title: "Gas".to_string(),
            description: Some("Round trip, Bo's car".to_string()),
            amount_cents: 8_150,
            payer_id: ids[1].0.clone(),
            category: ExpenseCategory::Transport,
            date: date(3),
            split_mode: SplitMode::Even,
            participants: vec![
                ParticipantRef::new(ids[0].0.clone()),
                ParticipantRef::new(ids[1].0.clone()),
                ParticipantRef::new(ids[3].0.clone()),
            ],
        },
        NewExpense {
            title: "Kayak rentals".to_string(),
            description: None,
            amount_cents: 12_000,
            payer_id: ids[3].0.clone(),
            category: ExpenseCategory::Activities,
            date: date(5),
            split_mode: SplitMode::Even,
            participants: everyone(),
        },
    ];

    for expense in &expenses {
        db.expenses().create(expense).await?;
    }

    let settlements = db.settlements().recalculate().await?;

    let summary = SeedSummary {
        people: ids.len(),
        expenses: expenses.len(),
        settlements: settlements.len(),
    };
    info!(?summary, "Seeded sample trip");

    Ok(summary)
}
