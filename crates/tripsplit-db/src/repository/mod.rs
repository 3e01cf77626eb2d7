//! # Repository Module
//!
//! Database repository implementations for tripsplit.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.expenses().create(&new_expense)                            │
//! │       ▼                                                                 │
//! │  ExpenseRepository                                                     │
//! │  ├── create(&self, input)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self)                                                       │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PersonRepository`](person::PersonRepository) - Trip members and payment info
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Expenses with ordered participants
//! - [`SettlementRepository`](settlement::SettlementRepository) - Recalculation and confirmations
//!
//! The snapshot loaders below take a bare connection so the same queries
//! run on the pool or inside the recalculation transaction.

pub mod expense;
pub mod person;
pub mod settlement;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use tripsplit_core::{Expense, ExpenseCategory, ParticipantRef, Person, SplitMode};

use crate::error::DbResult;

const PERSON_COLUMNS: &str = r#"
    id,
    name,
    color,
    default_nights,
    payment_method,
    payment_handle,
    created_at
"#;

/// Flat `expenses` row, before participants are attached.
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    title: String,
    description: Option<String>,
    amount_cents: i64,
    payer_id: String,
    category: ExpenseCategory,
    date: NaiveDate,
    split_mode: SplitMode,
    created_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn into_expense(self, participants: Vec<ParticipantRef>) -> Expense {
        Expense {
            id: self.id,
            title: self.title,
            description: self.description,
            total_cents: self.amount_cents,
            payer_id: self.payer_id,
            category: self.category,
            date: self.date,
            split_mode: self.split_mode,
            participants,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
    expense_id: String,
    person_id: String,
    nights: Option<u32>,
}

/// Loads all people in insertion order.
pub(crate) async fn fetch_people(conn: &mut SqliteConnection) -> DbResult<Vec<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY rowid");

    let people = sqlx::query_as::<_, Person>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    Ok(people)
}

/// Loads one person by id.
pub(crate) async fn fetch_person(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1");

    let person = sqlx::query_as::<_, Person>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(person)
}

/// Loads expenses matching `filter` (a trailing SQL clause, no user input)
/// with their participants in entry order.
async fn fetch_expenses_where(
    conn: &mut SqliteConnection,
    filter: &str,
    bind: Option<&str>,
) -> DbResult<Vec<Expense>> {
    let sql = format!(
        r#"
        SELECT
            id, title, description, amount_cents, payer_id,
            category, date, split_mode, created_at
        FROM expenses
        {filter}
        ORDER BY date DESC, rowid
        "#
    );

    let mut query = sqlx::query_as::<_, ExpenseRow>(&sql);
    if let Some(value) = bind {
        query = query.bind(value);
    }
    let rows = query.fetch_all(&mut *conn).await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let participant_sql = format!(
        r#"
        SELECT expense_id, person_id, nights
        FROM expense_participants
        WHERE expense_id IN (SELECT id FROM expenses {filter})
        ORDER BY expense_id, position
        "#
    );

    let mut participant_query = sqlx::query_as::<_, ParticipantRow>(&participant_sql);
    if let Some(value) = bind {
        participant_query = participant_query.bind(value);
    }
    let participant_rows = participant_query.fetch_all(&mut *conn).await?;

    let mut by_expense: HashMap<String, Vec<ParticipantRef>> = HashMap::new();
    for row in participant_rows {
        by_expense.entry(row.expense_id).or_default().push(ParticipantRef {
            person_id: row.person_id,
            nights: row.nights,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let participants = by_expense.remove(&row.id).unwrap_or_default();
            row.into_expense(participants)
        })
        .collect())
}

/// Loads every expense, newest date first.
pub(crate) async fn fetch_expenses(conn: &mut SqliteConnection) -> DbResult<Vec<Expense>> {
    fetch_expenses_where(conn, "", None).await
}

/// Loads one expense by id.
pub(crate) async fn fetch_expense(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Expense>> {
    let mut found = fetch_expenses_where(conn, "WHERE id = ?1", Some(id)).await?;
    Ok(found.pop())
}
