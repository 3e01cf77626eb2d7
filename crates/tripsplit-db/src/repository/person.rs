//! # Person Repository
//!
//! Trip members and their payment routing info.
//!
//! Payment method and handle are pass-through data: the settlement engine
//! never reads them, they are shown next to each suggested payment.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{fetch_people, fetch_person};
use tripsplit_core::validation::{validate_color, validate_payment_handle, validate_person_name};
use tripsplit_core::{PaymentMethod, Person, ValidationError, DEFAULT_PERSON_COLOR};

/// Repository for person database operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
}

impl PersonRepository {
    /// Creates a new PersonRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PersonRepository { pool }
    }

    /// Inserts a fully-formed person (used by seeding and imports).
    pub async fn insert(&self, person: &Person) -> DbResult<()> {
        debug!(id = %person.id, name = %person.name, "Inserting person");

        sqlx::query(
            r#"
            INSERT INTO people (
                id, name, color, default_nights,
                payment_method, payment_handle, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&person.id)
        .bind(&person.name)
        .bind(&person.color)
        .bind(person.default_nights)
        .bind(person.payment_method)
        .bind(&person.payment_handle)
        .bind(person.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates a new person.
    ///
    /// ## Arguments
    /// * `name` - Display name, trimmed
    /// * `color` - `#rrggbb`, or `None` for the default color
    /// * `default_nights` - Nights assumed for lodging, at least 1
    pub async fn create(&self, name: &str, color: Option<&str>, default_nights: u32) -> DbResult<Person> {
        validate_person_name(name)?;
        let color = color.unwrap_or(DEFAULT_PERSON_COLOR);
        validate_color(color)?;
        if default_nights < 1 {
            return Err(ValidationError::MustBePositive {
                field: "default_nights".to_string(),
            }
            .into());
        }

        let person = Person {
            id: generate_person_id(),
            name: name.trim().to_string(),
            color: color.to_lowercase(),
            default_nights: i64::from(default_nights),
            payment_method: None,
            payment_handle: None,
            created_at: Utc::now(),
        };

        self.insert(&person).await.map_err(|err| match err {
            DbError::UniqueViolation { ref field, .. } if field == "people.name" => {
                DbError::duplicate("name", person.name.clone())
            }
            other => other,
        })?;
        Ok(person)
    }

    /// Gets a person by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Person>> {
        let mut conn = self.pool.acquire().await?;
        fetch_person(&mut conn, id).await
    }

    /// Finds a person by display name, ignoring case.
    ///
    /// The schema keeps names unique under ASCII case folding only, so two
    /// names such as "Émile" and "émile" can coexist; a name that matches
    /// more than one person is an error rather than a guess.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Person>> {
        let wanted = name.trim().to_lowercase();
        let mut matches: Vec<Person> = self
            .list()
            .await?
            .into_iter()
            .filter(|p| p.name.to_lowercase() == wanted)
            .collect();

        if matches.len() > 1 {
            return Err(DbError::AmbiguousName {
                name: name.trim().to_string(),
                matches: matches.len(),
            });
        }

        Ok(matches.pop())
    }

    /// Lists everyone in the order they were added.
    pub async fn list(&self) -> DbResult<Vec<Person>> {
        let mut conn = self.pool.acquire().await?;
        fetch_people(&mut conn).await
    }

    /// Sets or clears how a person wants to be paid.
    ///
    /// A blank handle clears it.
    pub async fn update_payment_info(
        &self,
        id: &str,
        method: Option<PaymentMethod>,
        handle: Option<&str>,
    ) -> DbResult<Person> {
        let handle = validate_payment_handle(handle)?;

        debug!(id = %id, method = ?method, "Updating payment info");

        let result = sqlx::query(
            r#"
            UPDATE people SET
                payment_method = ?2,
                payment_handle = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(method)
        .bind(&handle)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Person", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Person", id))
    }

    /// Counts people.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new person ID.
pub fn generate_person_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.people();

        let ana = repo.create("  Ana ", Some("#E07A5F"), 3).await.unwrap();
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.color, "#e07a5f");

        let loaded = repo.get_by_id(&ana.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Ana");
        assert_eq!(loaded.default_nights, 3);
        assert_eq!(loaded.payment_method, None);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let db = db().await;
        let repo = db.people();

        assert!(repo.create("   ", None, 1).await.unwrap_err().is_invalid_input());
        assert!(repo.create("Ana", Some("teal"), 1).await.unwrap_err().is_invalid_input());
        assert!(repo.create("Ana", None, 0).await.unwrap_err().is_invalid_input());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let db = db().await;
        let repo = db.people();

        let names = ["Cleo", "Ana", "Bo"];
        let mut created = Vec::new();
        for name in names {
            created.push(repo.create(name, None, 1).await.unwrap().id);
        }

        let listed = repo.list().await.unwrap();
        let listed_names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        let listed_ids: Vec<String> = listed.iter().map(|p| p.id.clone()).collect();
        assert_eq!(listed_names, names);
        assert_eq!(listed_ids, created);
    }

    #[tokio::test]
    async fn test_find_by_name_ignores_case() {
        let db = db().await;
        let repo = db.people();
        let bo = repo.create("Bo", None, 1).await.unwrap();

        assert_eq!(repo.find_by_name("bO").await.unwrap().unwrap().id, bo.id);
        assert!(repo.find_by_name("Ana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_names_unique_ignoring_case() {
        let db = db().await;
        let repo = db.people();
        let ana = repo.create("Ana", None, 1).await.unwrap();

        let err = repo.create(" ana ", None, 2).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, ref value } if field == "name" && value == "ana"));
        assert!(err.is_invalid_input());
        assert_eq!(repo.count().await.unwrap(), 1);

        assert_eq!(repo.find_by_name("ANA").await.unwrap().unwrap().id, ana.id);
    }

    #[tokio::test]
    async fn test_find_by_name_refuses_to_guess() {
        let db = db().await;
        let repo = db.people();

        // SQLite folds ASCII case only, so both rows are accepted
        repo.create("Émile", None, 1).await.unwrap();
        repo.create("émile", None, 1).await.unwrap();

        let err = repo.find_by_name("ÉMILE").await.unwrap_err();
        assert!(matches!(err, DbError::AmbiguousName { matches: 2, .. }));
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_update_payment_info() {
        let db = db().await;
        let repo = db.people();
        let ana = repo.create("Ana", None, 1).await.unwrap();

        let updated = repo
            .update_payment_info(&ana.id, Some(PaymentMethod::CashApp), Some(" $ana "))
            .await
            .unwrap();
        assert_eq!(updated.payment_method, Some(PaymentMethod::CashApp));
        assert_eq!(updated.payment_handle.as_deref(), Some("$ana"));

        let cleared = repo.update_payment_info(&ana.id, None, Some("")).await.unwrap();
        assert_eq!(cleared.payment_method, None);
        assert_eq!(cleared.payment_handle, None);
    }

    #[tokio::test]
    async fn test_update_payment_info_unknown_person() {
        let db = db().await;
        let err = db
            .people()
            .update_payment_info("missing", Some(PaymentMethod::Venmo), Some("@x"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
