//! Hat repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lobsters_core::{HatId, UserId};

use super::RepositoryError;
use crate::models::Hat;

#[derive(sqlx::FromRow)]
struct HatRow {
    id: i32,
    user_id: i32,
    hat: String,
    link: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<HatRow> for Hat {
    fn from(r: HatRow) -> Self {
        Self {
            id: HatId::new(r.id),
            user_id: UserId::new(r.user_id),
            hat: r.hat,
            link: r.link,
            created_at: r.created_at,
        }
    }
}

/// Repository for hat lookups.
pub struct HatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HatRepository<'a> {
    /// Create a new hat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a hat by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: HatId) -> Result<Option<Hat>, RepositoryError> {
        let row = sqlx::query_as::<_, HatRow>(
            r"
            SELECT id, user_id, hat, link, created_at
            FROM hats
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Hat::from))
    }

    /// Get every hat owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<Hat>, RepositoryError> {
        let rows = sqlx::query_as::<_, HatRow>(
            r"
            SELECT id, user_id, hat, link, created_at
            FROM hats
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Hat::from).collect())
    }
}
