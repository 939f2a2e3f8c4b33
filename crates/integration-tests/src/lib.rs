//! Integration tests for Lobsters.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory scenarios
//! cargo test -p lobsters-integration-tests
//!
//! # Including the PostgreSQL-backed tests
//! LOBSTERS_TEST_DATABASE_URL=postgres://localhost/lobsters_test \
//!     cargo test -p lobsters-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `recent_mentions` - URL mention lookups over a fake comment store
//! - `comment_validation` - Write-time comment rules
//! - `story_search` - Story index definition and ranking
//! - `database` - Repositories against a real database

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lobsters_core::{CommentId, HatId, ShortId, StoryId, UserId};
use lobsters_site::models::{Comment, Hat, Story, StoryDocument};
use lobsters_site::services::CommentStore;

/// Fixed clock used by every fixture.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// A comment by user 1 on story 1, posted `hours_ago` before [`now`].
///
/// # Panics
///
/// Panics if `id` does not form a valid short id.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn comment(id: i32, body: &str, hours_ago: i64) -> Comment {
    let created_at = now() - Duration::hours(hours_ago);
    Comment {
        id: CommentId::new(id),
        short_id: ShortId::parse(&format!("c{id}")).unwrap(),
        story_id: StoryId::new(1),
        user_id: UserId::new(1),
        parent_comment_id: None,
        hat_id: None,
        body: body.to_string(),
        rendered_body: String::new(),
        created_at,
        updated_at: created_at,
    }
}

/// A hat owned by `owner`.
#[must_use]
pub fn hat(id: i32, owner: i32) -> Hat {
    Hat {
        id: HatId::new(id),
        user_id: UserId::new(owner),
        hat: "Sysop".to_string(),
        link: None,
        created_at: now(),
    }
}

/// A live story by `author` with one upvote per `id`.
///
/// # Panics
///
/// Panics if `id` does not form a valid short id.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn story(id: i32, title: &str, author: &str, tags: &[&str]) -> StoryDocument {
    StoryDocument {
        story: Story {
            id: StoryId::new(id),
            short_id: ShortId::parse(&format!("st{id}")).unwrap(),
            user_id: UserId::new(1),
            title: title.to_string(),
            url: None,
            description: String::new(),
            upvotes: id,
            downvotes: 0,
            hotness: 0.0,
            is_expired: false,
            created_at: now() - Duration::hours(i64::from(id)),
        },
        author: author.to_string(),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}

/// Error returned by an unavailable [`MemoryCommentStore`].
#[derive(Debug, thiserror::Error)]
#[error("comment store unavailable")]
pub struct StoreUnavailable;

/// In-memory comment store that records every query.
#[derive(Debug, Default)]
pub struct MemoryCommentStore {
    comments: Vec<Comment>,
    unavailable: bool,
    queries: Mutex<Vec<DateTime<Utc>>>,
}

impl MemoryCommentStore {
    /// A store holding `comments` in the given order.
    #[must_use]
    pub fn with_comments(comments: Vec<Comment>) -> Self {
        Self {
            comments,
            ..Self::default()
        }
    }

    /// A store that fails every query.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Every `since` the store has been queried with.
    ///
    /// # Panics
    ///
    /// Panics if a previous query panicked while holding the lock.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn queries(&self) -> Vec<DateTime<Utc>> {
        self.queries.lock().unwrap().clone()
    }
}

impl CommentStore for MemoryCommentStore {
    type Error = StoreUnavailable;

    #[allow(clippy::unwrap_used)]
    async fn comments_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, Self::Error> {
        self.queries.lock().unwrap().push(since);
        if self.unavailable {
            return Err(StoreUnavailable);
        }
        Ok(self
            .comments
            .iter()
            .filter(|c| c.created_at >= since)
            .cloned()
            .collect())
    }
}

impl CommentStore for &MemoryCommentStore {
    type Error = StoreUnavailable;

    async fn comments_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, Self::Error> {
        (**self).comments_created_since(since).await
    }
}
