//! # Expense Repository
//!
//! Database operations for expenses and their participants.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(&NewExpense)                                                    │
//! │       │                                                                 │
//! │       ├── validate_new_expense (core)  → InvalidInput, nothing written │
//! │       │                                                                 │
//! │       ├── BEGIN                                                         │
//! │       │     INSERT expenses                                             │
//! │       │     INSERT expense_participants (position 0, 1, 2, ...)        │
//! │       └── COMMIT                                                        │
//! │                                                                         │
//! │  Any failure drops the transaction: no expense without participants.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `position` records the order participants were entered in. The first
//! one absorbs leftover cents when the expense is split, so reading them
//! back in any other order would shift cents between people.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{fetch_expense, fetch_expenses};
use tripsplit_core::validation::validate_new_expense;
use tripsplit_core::{Expense, NewExpense, ParticipantRef, SplitMode};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records a new expense with its participants.
    ///
    /// The date defaults to today (UTC). Nights are kept only for
    /// weighted splits.
    ///
    /// ## Errors
    /// - [`DbError::Core`] when the input fails validation
    /// - [`DbError::ForeignKeyViolation`] when the payer or a participant
    ///   is not a known person
    pub async fn create(&self, input: &NewExpense) -> DbResult<Expense> {
        validate_new_expense(input)?;

        let now = Utc::now();
        let expense = Expense {
            id: generate_expense_id(),
            title: input.title.trim().to_string(),
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            total_cents: input.amount_cents,
            payer_id: input.payer_id.clone(),
            category: input.category,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            split_mode: input.split_mode,
            participants: input
                .participants
                .iter()
                .map(|p| ParticipantRef {
                    person_id: p.person_id.clone(),
                    nights: match input.split_mode {
                        SplitMode::Weighted => p.nights,
                        SplitMode::Even => None,
                    },
                })
                .collect(),
            created_at: now,
        };

        debug!(
            id = %expense.id,
            amount_cents = expense.total_cents,
            participants = expense.participants.len(),
            "Creating expense"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, title, description, amount_cents, payer_id,
                category, date, split_mode, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.title)
        .bind(&expense.description)
        .bind(expense.total_cents)
        .bind(&expense.payer_id)
        .bind(expense.category)
        .bind(expense.date)
        .bind(expense.split_mode)
        .bind(expense.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, participant) in expense.participants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO expense_participants (expense_id, person_id, position, nights)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&expense.id)
            .bind(&participant.person_id)
            .bind(position as i64)
            .bind(participant.nights)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %expense.id, title = %expense.title, "Expense recorded");

        Ok(expense)
    }

    /// Gets an expense by ID, participants in entry order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let mut conn = self.pool.acquire().await?;
        fetch_expense(&mut conn, id).await
    }

    /// Lists all expenses, newest date first, then in the order recorded.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let mut conn = self.pool.acquire().await?;
        fetch_expenses(&mut conn).await
    }

    /// Deletes an expense and its participant rows.
    ///
    /// Stored settlements are not touched; recalculate afterwards.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }

    /// Counts expenses.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new expense ID.
pub fn generate_expense_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use tripsplit_core::ExpenseCategory;

    async fn trip() -> (Database, Vec<String>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for name in ["Ana", "Bo", "Cleo"] {
            ids.push(db.people().create(name, None, 1).await.unwrap().id);
        }
        (db, ids)
    }

    fn dinner(payer: &str, participants: &[String]) -> NewExpense {
        NewExpense {
            title: " Dinner ".to_string(),
            description: Some("  ".to_string()),
            amount_cents: 1000,
            payer_id: payer.to_string(),
            category: ExpenseCategory::Food,
            date: NaiveDate::from_ymd_opt(2025, 7, 4),
            split_mode: SplitMode::Even,
            participants: participants.iter().map(ParticipantRef::new).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_round_trips_participant_order() {
        let (db, ids) = trip().await;
        let repo = db.expenses();

        // Deliberately not in insertion order
        let order = vec![ids[2].clone(), ids[0].clone(), ids[1].clone()];
        let created = repo.create(&dinner(&ids[0], &order)).await.unwrap();
        assert_eq!(created.title, "Dinner");
        assert_eq!(created.description, None);

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        let loaded_order: Vec<String> = loaded.participants.iter().map(|p| p.person_id.clone()).collect();
        assert_eq!(loaded_order, order);
        assert_eq!(loaded.total_cents, 1000);
        assert_eq!(loaded.category, ExpenseCategory::Food);
        assert!(loaded.participants.iter().all(|p| p.nights.is_none()));
    }

    #[tokio::test]
    async fn test_weighted_expense_keeps_nights() {
        let (db, ids) = trip().await;
        let repo = db.expenses();

        let cabin = NewExpense {
            title: "Cabin".to_string(),
            description: None,
            amount_cents: 90_000,
            payer_id: ids[0].clone(),
            category: ExpenseCategory::Lodging,
            date: None,
            split_mode: SplitMode::Weighted,
            participants: vec![
                ParticipantRef::with_nights(ids[0].clone(), 2),
                ParticipantRef::with_nights(ids[1].clone(), 1),
            ],
        };

        let created = repo.create(&cabin).await.unwrap();
        assert_eq!(created.date, Utc::now().date_naive());

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        let nights: Vec<Option<u32>> = loaded.participants.iter().map(|p| p.nights).collect();
        assert_eq!(nights, vec![Some(2), Some(1)]);
    }

    #[tokio::test]
    async fn test_invalid_expense_writes_nothing() {
        let (db, ids) = trip().await;
        let repo = db.expenses();

        let mut bad = dinner(&ids[0], &ids);
        bad.amount_cents = 0;
        assert!(repo.create(&bad).await.unwrap_err().is_invalid_input());

        let mut bad = dinner(&ids[0], &ids);
        bad.participants.clear();
        assert!(repo.create(&bad).await.unwrap_err().is_invalid_input());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_participant_rolls_back() {
        let (db, ids) = trip().await;
        let repo = db.expenses();

        let mut participants = ids.clone();
        participants.push("not-a-person".to_string());

        let err = repo.create(&dinner(&ids[0], &participants)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_newest_date_first() {
        let (db, ids) = trip().await;
        let repo = db.expenses();

        let mut early = dinner(&ids[0], &ids);
        early.title = "Early".to_string();
        early.date = NaiveDate::from_ymd_opt(2025, 7, 1);
        let mut late = dinner(&ids[1], &ids);
        late.title = "Late".to_string();
        late.date = NaiveDate::from_ymd_opt(2025, 7, 3);

        repo.create(&early).await.unwrap();
        repo.create(&late).await.unwrap();

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Late", "Early"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, ids) = trip().await;
        let repo = db.expenses();
        let created = repo.create(&dinner(&ids[0], &ids)).await.unwrap();

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&created.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
