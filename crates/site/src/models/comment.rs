//! Comment domain types and write-time validation.

use chrono::{DateTime, Utc};
use comrak::{Options, markdown_to_html};

use lobsters_core::{CommentId, HatId, ShortId, StoryId, UserId};

use super::hat::Hat;
use super::validation::ValidationErrors;

/// Storage ceiling for rendered comment markup (MEDIUMTEXT).
pub const MAX_RENDERED_BODY_LENGTH: usize = 16_777_215;

/// A persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Unique comment ID.
    pub id: CommentId,
    /// Public short id, assigned once at creation.
    pub short_id: ShortId,
    /// Story the comment belongs to.
    pub story_id: StoryId,
    /// Author.
    pub user_id: UserId,
    /// Comment being replied to, if any.
    pub parent_comment_id: Option<CommentId>,
    /// Hat worn by the author on this comment.
    pub hat_id: Option<HatId>,
    /// Markdown source as written by the author.
    pub body: String,
    /// HTML rendered from `body`.
    pub rendered_body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// When the comment was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Whether the body contains `url` verbatim.
    ///
    /// Case-sensitive and unnormalized: `http://` does not match `https://`,
    /// and a trailing slash matters.
    #[must_use]
    pub fn mentions(&self, url: &str) -> bool {
        self.body.contains(url)
    }
}

/// A comment that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Author.
    pub user_id: UserId,
    /// Story being commented on.
    pub story_id: StoryId,
    /// Comment being replied to, if any.
    pub parent_comment_id: Option<CommentId>,
    /// Markdown source.
    pub body: String,
    /// Rendered HTML.
    pub rendered_body: String,
    /// Explicitly requested short id; one is generated when absent.
    pub short_id: Option<String>,
    /// Hat the author wants to wear.
    pub hat: Option<Hat>,
}

impl NewComment {
    /// Start a top-level comment, rendering `body` to HTML.
    #[must_use]
    pub fn new(user_id: UserId, story_id: StoryId, body: impl Into<String>) -> Self {
        let body = body.into();
        let rendered_body = render_markdown(&body);
        Self {
            user_id,
            story_id,
            parent_comment_id: None,
            body,
            rendered_body,
            short_id: None,
            hat: None,
        }
    }

    /// Mark this comment as a reply.
    #[must_use]
    pub const fn in_reply_to(mut self, parent: CommentId) -> Self {
        self.parent_comment_id = Some(parent);
        self
    }

    /// Wear a hat on this comment.
    #[must_use]
    pub fn wearing(mut self, hat: Hat) -> Self {
        self.hat = Some(hat);
        self
    }

    /// Request a specific short id.
    #[must_use]
    pub fn with_short_id(mut self, short_id: impl Into<String>) -> Self {
        self.short_id = Some(short_id.into());
        self
    }

    /// Check every write-time rule, returning all failures at once.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.body.trim().is_empty() {
            errors.add("body", "can't be blank");
        }

        if self.rendered_body.chars().count() > MAX_RENDERED_BODY_LENGTH {
            errors.add(
                "rendered_body",
                format!("is too long (maximum is {MAX_RENDERED_BODY_LENGTH} characters)"),
            );
        }

        if let Some(short_id) = &self.short_id
            && let Err(e) = ShortId::parse(short_id)
        {
            errors.add("short_id", e.to_string());
        }

        if let Some(hat) = &self.hat
            && !hat.wearable_by(self.user_id)
        {
            errors.add("hat", "not wearable by user");
        }

        errors
    }
}

/// Render comment markdown to HTML.
///
/// Raw HTML in the source is dropped rather than passed through.
#[must_use]
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.r#unsafe = false;

    markdown_to_html(body, &options)
}
