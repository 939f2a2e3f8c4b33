//! Comment posting.
//!
//! Resolves the worn hat, validates the draft and persists it with a fresh
//! short id.

use sqlx::PgPool;
use tracing::{info, instrument};

use lobsters_core::{HatId, ShortId};

use crate::db::{CommentRepository, CreateComment, HatRepository, RepositoryError};
use crate::models::{Comment, NewComment, ValidationErrors};

/// Errors from posting a comment.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// The draft failed validation.
    #[error("invalid comment: {0}")]
    Invalid(ValidationErrors),

    /// The requested hat does not exist.
    #[error("hat {0} not found")]
    HatNotFound(HatId),

    /// The explicitly requested short id belongs to another comment.
    #[error("short id {0} is already taken")]
    ShortIdTaken(ShortId),

    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service for writing comments.
pub struct CommentService<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentService<'a> {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate and persist `draft`, optionally wearing the hat `hat_id`.
    ///
    /// # Errors
    ///
    /// Returns `PostError::HatNotFound` if `hat_id` names no hat.
    /// Returns `PostError::Invalid` with every failed rule if validation fails.
    /// Returns `PostError::ShortIdTaken` if the requested short id is in use.
    /// Returns `PostError::Repository` if the insert fails, including
    /// `RepositoryError::Conflict` when no random short id was free.
    #[instrument(
        skip(self, draft),
        fields(story_id = %draft.story_id, user_id = %draft.user_id)
    )]
    pub async fn post(
        &self,
        mut draft: NewComment,
        hat_id: Option<HatId>,
    ) -> Result<Comment, PostError> {
        if let Some(hat_id) = hat_id {
            let hat = HatRepository::new(self.pool)
                .get_by_id(hat_id)
                .await?
                .ok_or(PostError::HatNotFound(hat_id))?;
            draft = draft.wearing(hat);
        }

        let params = prepare(&draft).map_err(PostError::Invalid)?;
        let comment = CommentRepository::new(self.pool)
            .create(&params)
            .await
            .map_err(|e| creation_failed(params.short_id.as_ref(), e))?;

        info!(
            short_id = %comment.short_id,
            story_id = %comment.story_id,
            "Comment posted"
        );
        Ok(comment)
    }
}

/// Validate `draft` and turn it into insert parameters.
fn prepare(draft: &NewComment) -> Result<CreateComment, ValidationErrors> {
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(errors);
    }

    let short_id = draft
        .short_id
        .as_deref()
        .map(ShortId::parse)
        .transpose()
        .map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("short_id", e.to_string());
            errors
        })?;

    Ok(CreateComment {
        user_id: draft.user_id,
        story_id: draft.story_id,
        parent_comment_id: draft.parent_comment_id,
        hat_id: draft.hat.as_ref().map(|h| h.id),
        body: draft.body.clone(),
        rendered_body: draft.rendered_body.clone(),
        short_id,
    })
}

/// Attribute a conflict on a requested short id to the author.
fn creation_failed(requested: Option<&ShortId>, e: RepositoryError) -> PostError {
    match (requested, e) {
        (Some(short_id), RepositoryError::Conflict(_)) => PostError::ShortIdTaken(short_id.clone()),
        (_, e) => PostError::Repository(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use lobsters_core::{CommentId, StoryId, UserId};

    use super::*;
    use crate::models::Hat;

    fn hat(owner: i32) -> Hat {
        Hat {
            id: HatId::new(9),
            user_id: UserId::new(owner),
            hat: "Sysop".to_string(),
            link: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prepare_carries_draft_fields() {
        let draft = NewComment::new(UserId::new(1), StoryId::new(2), "hello *world*")
            .in_reply_to(CommentId::new(3))
            .wearing(hat(1))
            .with_short_id("abc123");

        let params = prepare(&draft).unwrap();
        assert_eq!(params.user_id, UserId::new(1));
        assert_eq!(params.story_id, StoryId::new(2));
        assert_eq!(params.parent_comment_id, Some(CommentId::new(3)));
        assert_eq!(params.hat_id, Some(HatId::new(9)));
        assert_eq!(params.short_id.unwrap().as_str(), "abc123");
        assert!(params.rendered_body.contains("<em>world</em>"));
    }

    #[test]
    fn test_prepare_leaves_short_id_for_generation() {
        let draft = NewComment::new(UserId::new(1), StoryId::new(2), "hi");
        assert!(prepare(&draft).unwrap().short_id.is_none());
    }

    #[test]
    fn test_prepare_rejects_invalid_draft() {
        let draft = NewComment::new(UserId::new(1), StoryId::new(2), "  ")
            .wearing(hat(5))
            .with_short_id("01234567890");

        let errors = prepare(&draft).unwrap_err();
        assert_eq!(errors.on("body"), ["can't be blank"]);
        assert_eq!(errors.on("hat"), ["not wearable by user"]);
        assert_eq!(errors.on("short_id").len(), 1);
    }

    #[test]
    fn test_taken_requested_short_id_is_the_authors_error() {
        let requested = ShortId::parse("abc123").unwrap();
        let err = creation_failed(
            Some(&requested),
            RepositoryError::Conflict("short id abc123 already exists".into()),
        );
        assert!(matches!(err, PostError::ShortIdTaken(ref id) if id.as_str() == "abc123"));
        assert_eq!(err.to_string(), "short id abc123 is already taken");
    }

    #[test]
    fn test_exhausted_random_short_ids_stay_repository_errors() {
        let err = creation_failed(None, RepositoryError::Conflict("no free short id".into()));
        assert!(matches!(
            err,
            PostError::Repository(RepositoryError::Conflict(_))
        ));

        let requested = ShortId::parse("abc123").unwrap();
        let err = creation_failed(
            Some(&requested),
            RepositoryError::DataCorruption("bad row".into()),
        );
        assert!(matches!(
            err,
            PostError::Repository(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_post_error_messages() {
        assert_eq!(
            PostError::HatNotFound(HatId::new(4)).to_string(),
            "hat 4 not found"
        );
        let mut errors = ValidationErrors::new();
        errors.add("body", "can't be blank");
        assert_eq!(
            PostError::Invalid(errors).to_string(),
            "invalid comment: body can't be blank"
        );
    }
}
