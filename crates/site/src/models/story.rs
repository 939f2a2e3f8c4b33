//! Story domain types.

use chrono::{DateTime, Utc};

use lobsters_core::{ShortId, StoryId, UserId};

/// A submitted story.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    /// Unique story ID.
    pub id: StoryId,
    /// Public short id.
    pub short_id: ShortId,
    /// Submitter.
    pub user_id: UserId,
    /// Story title.
    pub title: String,
    /// Linked URL, absent for text posts.
    pub url: Option<String>,
    /// Submitter-provided description (markdown).
    pub description: String,
    /// Number of upvotes.
    pub upvotes: i32,
    /// Number of downvotes.
    pub downvotes: i32,
    /// Precomputed ranking value; lower is hotter.
    pub hotness: f64,
    /// Whether the story has been removed from circulation.
    pub is_expired: bool,
    /// When the story was submitted.
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Net score: upvotes minus downvotes, widened before subtracting.
    #[must_use]
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// A story denormalized with its author and tags for search indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryDocument {
    /// The story itself.
    pub story: Story,
    /// Username of the submitter.
    pub author: String,
    /// Tag names attached to the story.
    pub tags: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_net_votes() {
        let mut story = Story {
            id: StoryId::new(1),
            short_id: ShortId::parse("abc123").unwrap(),
            user_id: UserId::new(1),
            title: "Title".to_string(),
            url: None,
            description: String::new(),
            upvotes: 3,
            downvotes: 10,
            hotness: 0.0,
            is_expired: false,
            created_at: Utc::now(),
        };
        assert_eq!(story.score(), -7);

        story.upvotes = i32::MAX;
        story.downvotes = i32::MIN;
        assert_eq!(story.score(), i64::from(i32::MAX) - i64::from(i32::MIN));
    }
}
