//! Story repository for database operations.
//!
//! Stories are read here only for search indexing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lobsters_core::{ShortId, StoryId, UserId};

use super::RepositoryError;
use crate::models::{Story, StoryDocument};

#[derive(sqlx::FromRow)]
struct IndexableStoryRow {
    id: i32,
    short_id: String,
    user_id: i32,
    title: String,
    url: Option<String>,
    description: String,
    upvotes: i32,
    downvotes: i32,
    hotness: f64,
    is_expired: bool,
    created_at: DateTime<Utc>,
    author: String,
    tags: Vec<String>,
}

impl TryFrom<IndexableStoryRow> for StoryDocument {
    type Error = RepositoryError;

    fn try_from(r: IndexableStoryRow) -> Result<Self, Self::Error> {
        let short_id = ShortId::parse(&r.short_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid story short id in database: {e}"))
        })?;

        Ok(Self {
            story: Story {
                id: StoryId::new(r.id),
                short_id,
                user_id: UserId::new(r.user_id),
                title: r.title,
                url: r.url,
                description: r.description,
                upvotes: r.upvotes,
                downvotes: r.downvotes,
                hotness: r.hotness,
                is_expired: r.is_expired,
                created_at: r.created_at,
            },
            author: r.author,
            tags: r.tags,
        })
    }
}

/// Repository for story database operations.
pub struct StoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoryRepository<'a> {
    /// Create a new story repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a page of non-expired stories with author and tags, ordered by ID.
    ///
    /// Pass the last ID of the previous page as `after` to continue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored short id is invalid.
    pub async fn indexable_page(
        &self,
        after: Option<StoryId>,
        limit: i64,
    ) -> Result<Vec<StoryDocument>, RepositoryError> {
        let rows = sqlx::query_as::<_, IndexableStoryRow>(
            r"
            SELECT s.id, s.short_id, s.user_id, s.title, s.url, s.description,
                   s.upvotes, s.downvotes, s.hotness, s.is_expired, s.created_at,
                   u.username AS author,
                   COALESCE(
                       ARRAY_AGG(t.tag ORDER BY t.tag) FILTER (WHERE t.tag IS NOT NULL),
                       '{}'
                   ) AS tags
            FROM stories s
            JOIN users u ON u.id = s.user_id
            LEFT JOIN taggings tg ON tg.story_id = s.id
            LEFT JOIN tags t ON t.id = tg.tag_id
            WHERE s.is_expired = FALSE
              AND s.id > $1
            GROUP BY s.id, u.username
            ORDER BY s.id ASC
            LIMIT $2
            ",
        )
        .bind(after.map_or(0, |id| id.as_i32()))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoryDocument::try_from).collect()
    }
}
