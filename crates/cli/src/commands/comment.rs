//! Comment posting.
//!
//! # Usage
//!
//! ```bash
//! lobsters comment --user 1 --story 7 "Great write-up"
//! lobsters comment --user 1 --story 7 --parent 12 --hat 3 "Replying as sysop"
//! ```

use lobsters_core::{CommentId, HatId, StoryId, UserId};
use lobsters_site::error::AppError;
use lobsters_site::models::NewComment;
use lobsters_site::state::AppState;

/// Arguments for posting a comment.
pub struct CommentArgs {
    pub user: i32,
    pub story: i32,
    pub parent: Option<i32>,
    pub hat: Option<i32>,
    pub short_id: Option<String>,
    pub body: String,
}

/// Validate and post a comment, printing its short id.
///
/// # Errors
///
/// Returns `AppError::Post` if the hat is unknown, validation fails, or the
/// insert fails.
pub async fn run(state: &AppState, args: CommentArgs) -> Result<(), AppError> {
    let mut draft = NewComment::new(UserId::new(args.user), StoryId::new(args.story), args.body);
    if let Some(parent) = args.parent {
        draft = draft.in_reply_to(CommentId::new(parent));
    }
    if let Some(short_id) = args.short_id {
        draft = draft.with_short_id(short_id);
    }

    let comment = state
        .comment_service()
        .post(draft, args.hat.map(HatId::new))
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", comment.short_id);
    }
    Ok(())
}
