//! Comment repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use lobsters_core::{CommentId, HatId, ShortId, StoryId, UserId};

use super::RepositoryError;
use crate::models::Comment;
use crate::services::mentions::CommentStore;

/// Attempts at drawing an unused random short id before giving up.
const MAX_SHORT_ID_ATTEMPTS: usize = 10;

/// Constraint guarding `comments.short_id` uniqueness.
const SHORT_ID_CONSTRAINT: &str = "comments_short_id_key";

const COMMENT_COLUMNS: &str = "id, short_id, story_id, user_id, parent_comment_id, hat_id, \
                               comment, markeddown_comment, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i32,
    short_id: String,
    story_id: i32,
    user_id: i32,
    parent_comment_id: Option<i32>,
    hat_id: Option<i32>,
    comment: String,
    markeddown_comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = RepositoryError;

    fn try_from(r: CommentRow) -> Result<Self, Self::Error> {
        let short_id = ShortId::parse(&r.short_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid short id in database: {e}"))
        })?;

        Ok(Self {
            id: CommentId::new(r.id),
            short_id,
            story_id: StoryId::new(r.story_id),
            user_id: UserId::new(r.user_id),
            parent_comment_id: r.parent_comment_id.map(CommentId::new),
            hat_id: r.hat_id.map(HatId::new),
            body: r.comment,
            rendered_body: r.markeddown_comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Parameters for inserting a validated comment.
#[derive(Debug, Clone)]
pub struct CreateComment {
    /// Author.
    pub user_id: UserId,
    /// Story being commented on.
    pub story_id: StoryId,
    /// Comment being replied to.
    pub parent_comment_id: Option<CommentId>,
    /// Hat worn on the comment.
    pub hat_id: Option<HatId>,
    /// Markdown source.
    pub body: String,
    /// Rendered HTML.
    pub rendered_body: String,
    /// Requested short id; a random one is drawn when absent.
    pub short_id: Option<ShortId>,
}

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a comment by its public short id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored short id is invalid.
    pub async fn get_by_short_id(
        &self,
        short_id: &ShortId,
    ) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE short_id = $1"
        ))
        .bind(short_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    /// Get every comment created at or after `since`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any stored short id is invalid.
    pub async fn created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE created_at >= $1 ORDER BY id ASC"
        ))
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    /// Insert a comment, assigning a short id.
    ///
    /// When no short id is requested, random ones are drawn until one is
    /// free, up to a fixed number of attempts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the requested short id is taken
    /// or no free random id was found.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, params), fields(story_id = %params.story_id, user_id = %params.user_id))]
    pub async fn create(&self, params: &CreateComment) -> Result<Comment, RepositoryError> {
        for attempt in 1..=MAX_SHORT_ID_ATTEMPTS {
            let short_id = params
                .short_id
                .clone()
                .unwrap_or_else(|| ShortId::generate(&mut rand::rng()));

            match self.insert(params, &short_id).await {
                Ok(row) => return Comment::try_from(row),
                Err(e) if is_short_id_conflict(&e) => {
                    if params.short_id.is_some() {
                        return Err(RepositoryError::Conflict(format!(
                            "short id {short_id} already exists"
                        )));
                    }
                    debug!(attempt, %short_id, "Short id collision, drawing another");
                }
                Err(e) => return Err(RepositoryError::Database(e)),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "no free short id after {MAX_SHORT_ID_ATTEMPTS} attempts"
        )))
    }

    async fn insert(
        &self,
        params: &CreateComment,
        short_id: &ShortId,
    ) -> Result<CommentRow, sqlx::Error> {
        sqlx::query_as::<_, CommentRow>(&format!(
            r"
            INSERT INTO comments
                (short_id, story_id, user_id, parent_comment_id, hat_id, comment, markeddown_comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(short_id)
        .bind(params.story_id)
        .bind(params.user_id)
        .bind(params.parent_comment_id)
        .bind(params.hat_id)
        .bind(&params.body)
        .bind(&params.rendered_body)
        .fetch_one(self.pool)
        .await
    }
}

impl CommentStore for CommentRepository<'_> {
    type Error = RepositoryError;

    async fn comments_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, Self::Error> {
        self.created_since(since).await
    }
}

/// Whether `e` is a unique violation on the short id column.
fn is_short_id_conflict(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e
        && db_err.is_unique_violation()
    {
        return db_err.constraint() == Some(SHORT_ID_CONSTRAINT);
    }
    false
}
