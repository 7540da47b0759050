//! # User Repository
//!
//! Customers are owned by the account service; this crate only needs to
//! check that they exist and to maintain the synthetic POS walk-in user.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use bazaar_core::User;

/// Repository for users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, name, created_at FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Creates a user with a fresh ID.
    pub async fn create(&self, email: &str, name: &str) -> DbResult<User> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
                other => other,
            })?;

        Ok(user)
    }

    /// Returns the user with `email`, creating it inside `tx` if absent.
    ///
    /// `INSERT OR IGNORE` makes two concurrent first POS sales converge on a
    /// single walk-in row.
    pub async fn find_or_create_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        email: &str,
        name: &str,
    ) -> DbResult<User> {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(new_id())
        .bind(email)
        .bind(name)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if inserted.rows_affected() == 1 {
            debug!(email = %email, "Created walk-in user");
        }

        let user = sqlx::query_as::<_, User>("SELECT id, email, name, created_at FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&mut **tx)
            .await?;

        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
