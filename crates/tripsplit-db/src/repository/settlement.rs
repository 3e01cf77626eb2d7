//! # Settlement Repository
//!
//! Stores the suggested payments and their confirmation flags.
//!
//! ## Recalculation Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  recalculate()                                                          │
//! │                                                                         │
//! │  recompute_lock.lock()          one recalculation per process          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    DELETE FROM settlements      first write: takes SQLite's write      │
//! │       │                         lock, so other processes wait too      │
//! │       ▼                                                                 │
//! │    load people + expenses       snapshot read inside the transaction   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    compute_settlement (core)    allocate → aggregate → simplify        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    INSERT one row per payment   both flags false                       │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction: the previous set stays in place.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Confirmation flags are the only part of a settlement ever updated in
//! place. A recalculation discards them along with the old rows.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{fetch_expenses, fetch_people};
use tripsplit_core::{compute_settlement, Person, SettlementRecord, SettlementView, ValidationError};

const SETTLEMENT_COLUMNS: &str = r#"
    id,
    from_person_id,
    to_person_id,
    amount_cents,
    sender_confirmed,
    receiver_confirmed,
    created_at,
    updated_at
"#;

/// Repository for settlement database operations.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    pool: SqlitePool,
    recompute_lock: Arc<Mutex<()>>,
}

impl SettlementRepository {
    /// Creates a new SettlementRepository.
    ///
    /// Repositories sharing a database must share `recompute_lock`;
    /// [`Database::settlements`](crate::Database::settlements) does this.
    pub fn new(pool: SqlitePool, recompute_lock: Arc<Mutex<()>>) -> Self {
        SettlementRepository {
            pool,
            recompute_lock,
        }
    }

    /// Lists stored settlements with both people attached, newest first,
    /// then in the order the simplifier produced them.
    pub async fn list(&self) -> DbResult<Vec<SettlementView>> {
        let mut conn = self.pool.acquire().await?;
        fetch_views(&mut conn, "", None).await
    }

    /// Gets one settlement by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SettlementView>> {
        let mut conn = self.pool.acquire().await?;
        let mut found = fetch_views(&mut conn, "WHERE id = ?1", Some(id)).await?;
        Ok(found.pop())
    }

    /// Replaces all settlements with a fresh set computed from the
    /// current people and expenses.
    ///
    /// ## Errors
    /// [`DbError::Core`] when a stored expense cannot be split. The
    /// previous settlements are left untouched in that case.
    pub async fn recalculate(&self) -> DbResult<Vec<SettlementView>> {
        let _guard = self.recompute_lock.lock().await;

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM settlements")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let people = fetch_people(&mut tx).await?;
        let expenses = fetch_expenses(&mut tx).await?;
        let person_ids: Vec<String> = people.iter().map(|p| p.id.clone()).collect();

        let plan = compute_settlement(&expenses, &person_ids)?;

        let now = Utc::now();
        for (position, transaction) in plan.transactions.iter().enumerate() {
            debug!(
                from = %transaction.from,
                to = %transaction.to,
                amount_cents = transaction.amount_cents,
                "Inserting settlement"
            );

            sqlx::query(
                r#"
                INSERT INTO settlements (
                    id, from_person_id, to_person_id, amount_cents, position,
                    sender_confirmed, receiver_confirmed, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)
                "#,
            )
            .bind(generate_settlement_id())
            .bind(&transaction.from)
            .bind(&transaction.to)
            .bind(transaction.amount_cents)
            .bind(position as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let views = fetch_views(&mut tx, "", None).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            replaced = deleted,
            settlements = views.len(),
            expenses = expenses.len(),
            "Settlements recalculated"
        );

        Ok(views)
    }

    /// Records that the sender paid and/or the receiver got the money.
    ///
    /// `None` leaves a flag as it is; at least one flag must be given.
    pub async fn update_confirmation(
        &self,
        id: &str,
        sender_confirmed: Option<bool>,
        receiver_confirmed: Option<bool>,
    ) -> DbResult<SettlementView> {
        if sender_confirmed.is_none() && receiver_confirmed.is_none() {
            return Err(ValidationError::Required {
                field: "sender or receiver confirmation".to_string(),
            }
            .into());
        }

        debug!(
            id = %id,
            sender = ?sender_confirmed,
            receiver = ?receiver_confirmed,
            "Updating settlement confirmation"
        );

        let result = sqlx::query(
            r#"
            UPDATE settlements SET
                sender_confirmed = COALESCE(?2, sender_confirmed),
                receiver_confirmed = COALESCE(?3, receiver_confirmed),
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(sender_confirmed)
        .bind(receiver_confirmed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Settlement", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Settlement", id))
    }
}

/// Loads settlements (optionally filtered) joined with their people.
async fn fetch_views(
    conn: &mut SqliteConnection,
    filter: &str,
    bind: Option<&str>,
) -> DbResult<Vec<SettlementView>> {
    let sql = format!(
        "SELECT {SETTLEMENT_COLUMNS} FROM settlements {filter} ORDER BY created_at DESC, position"
    );

    let mut query = sqlx::query_as::<_, SettlementRecord>(&sql);
    if let Some(value) = bind {
        query = query.bind(value);
    }
    let records = query.fetch_all(&mut *conn).await?;

    if records.is_empty() {
        return Ok(Vec::new());
    }

    let people: HashMap<String, Person> = fetch_people(conn)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    records
        .into_iter()
        .map(|settlement| {
            let from_person = lookup(&people, &settlement.from_person_id)?;
            let to_person = lookup(&people, &settlement.to_person_id)?;
            Ok(SettlementView {
                settlement,
                from_person,
                to_person,
            })
        })
        .collect()
}

fn lookup(people: &HashMap<String, Person>, id: &str) -> DbResult<Person> {
    people
        .get(id)
        .cloned()
        .ok_or_else(|| DbError::not_found("Person", id))
}

/// Generates a new settlement ID.
pub fn generate_settlement_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
