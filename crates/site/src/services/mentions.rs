//! Recent URL mention detection.
//!
//! Finds comments posted within a trailing window whose body contains a
//! given URL. Used when a story is submitted to point at discussion that
//! already linked to it.

use std::future::Future;
use std::num::NonZeroU32;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};

use crate::models::Comment;

/// Source of recently created comments.
pub trait CommentStore: Send + Sync {
    /// Error surfaced by the underlying storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// All comments with `created_at >= since`, in storage order.
    fn comments_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send;
}

/// How far back to look for mentions, in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionWindow(NonZeroU32);

impl MentionWindow {
    /// Default window of 48 hours.
    pub const DEFAULT_HOURS: u32 = 48;

    /// A window of `hours`, or `None` when `hours` is zero.
    #[must_use]
    pub fn from_hours(hours: u32) -> Option<Self> {
        NonZeroU32::new(hours).map(Self)
    }

    /// Length of the window in hours.
    #[must_use]
    pub const fn hours(self) -> u32 {
        self.0.get()
    }

    /// Start of the window ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(i64::from(self.hours()))
    }
}

impl Default for MentionWindow {
    fn default() -> Self {
        Self(NonZeroU32::MIN.saturating_add(Self::DEFAULT_HOURS - 1))
    }
}

/// Finds recent comments that mention a URL.
#[derive(Debug, Clone)]
pub struct RecentMentionFinder<S> {
    store: S,
}

impl<S: CommentStore> RecentMentionFinder<S> {
    /// Create a finder reading from `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Comments from the last `window` hours whose body contains `url`.
    ///
    /// A missing or empty `url` yields no mentions without touching the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged if fetching comments fails.
    pub async fn find_mentions(
        &self,
        url: Option<&str>,
        window: MentionWindow,
    ) -> Result<Vec<Comment>, S::Error> {
        self.find_mentions_at(url, window, Utc::now()).await
    }

    /// Same as [`find_mentions`](Self::find_mentions) with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged if fetching comments fails.
    #[instrument(skip(self), fields(window_hours = window.hours()))]
    pub async fn find_mentions_at(
        &self,
        url: Option<&str>,
        window: MentionWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<Comment>, S::Error> {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return Ok(Vec::new());
        };

        let recent = self.store.comments_created_since(window.start(now)).await?;
        let scanned = recent.len();

        let mentions: Vec<Comment> = recent.into_iter().filter(|c| c.mentions(url)).collect();
        debug!(scanned, found = mentions.len(), "Scanned recent comments for URL");

        Ok(mentions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use lobsters_core::{CommentId, ShortId, StoryId, UserId};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Unreachable;

    /// Store that records each `since` it was asked for.
    #[derive(Default)]
    struct RecordingStore {
        comments: Vec<Comment>,
        fail: bool,
        calls: Mutex<Vec<DateTime<Utc>>>,
    }

    impl CommentStore for RecordingStore {
        type Error = Unreachable;

        async fn comments_created_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Comment>, Self::Error> {
            self.calls.lock().unwrap().push(since);
            if self.fail {
                return Err(Unreachable);
            }
            Ok(self
                .comments
                .iter()
                .filter(|c| c.created_at >= since)
                .cloned()
                .collect())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn comment(id: i32, body: &str, hours_ago: i64) -> Comment {
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

    #[tokio::test]
    async fn test_empty_url_skips_store() {
        let store = RecordingStore {
            comments: vec![comment(1, "anything", 1)],
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let found = finder
            .find_mentions_at(Some(""), MentionWindow::default(), now())
            .await
            .unwrap();
        assert!(found.is_empty());

        let found = finder
            .find_mentions_at(None, MentionWindow::default(), now())
            .await
            .unwrap();
        assert!(found.is_empty());

        assert!(finder.store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queries_trailing_window() {
        let finder = RecentMentionFinder::new(RecordingStore::default());
        let window = MentionWindow::from_hours(6).unwrap();

        finder
            .find_mentions_at(Some("https://lobste.rs"), window, now())
            .await
            .unwrap();

        let calls = finder.store.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), [now() - Duration::hours(6)]);
    }

    #[tokio::test]
    async fn test_returns_matches_in_store_order() {
        let store = RecordingStore {
            comments: vec![
                comment(1, "This is a comment with https://lobste.rs", 2),
                comment(2, "nothing to see", 3),
                comment(3, "This is a second comment with https://lobste.rs", 4),
            ],
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let found = finder
            .find_mentions_at(Some("https://lobste.rs"), MentionWindow::default(), now())
            .await
            .unwrap();

        let ids: Vec<i32> = found.iter().map(|c| c.id.as_i32()).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn test_ignores_comments_outside_window() {
        let store = RecordingStore {
            comments: vec![
                comment(1, "old https://lobste.rs", 49),
                comment(2, "new https://lobste.rs", 47),
            ],
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let found = finder
            .find_mentions_at(Some("https://lobste.rs"), MentionWindow::default(), now())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, CommentId::new(2));
    }

    #[tokio::test]
    async fn test_repeated_mentions_yield_one_entry() {
        let store = RecordingStore {
            comments: vec![comment(
                1,
                "https://lobste.rs and again https://lobste.rs",
                1,
            )],
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let found = finder
            .find_mentions_at(Some("https://lobste.rs"), MentionWindow::default(), now())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_match_is_not_normalized() {
        let store = RecordingStore {
            comments: vec![
                comment(1, "http://lobste.rs", 1),
                comment(2, "HTTPS://LOBSTE.RS", 1),
            ],
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let found = finder
            .find_mentions_at(Some("https://lobste.rs"), MentionWindow::default(), now())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let finder = RecentMentionFinder::new(store);

        let err = finder
            .find_mentions_at(Some("https://lobste.rs"), MentionWindow::default(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_window_defaults() {
        assert_eq!(MentionWindow::default().hours(), 48);
        assert!(MentionWindow::from_hours(0).is_none());
        assert_eq!(
            MentionWindow::default().start(now()),
            now() - Duration::hours(48)
        );
    }
}
