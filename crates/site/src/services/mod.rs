//! Business logic services.
//!
//! - [`mentions`] - Recent comments linking to a URL
//! - [`comments`] - Validating and posting comments

pub mod comments;
pub mod mentions;

pub use comments::{CommentService, PostError};
pub use mentions::{CommentStore, MentionWindow, RecentMentionFinder};
