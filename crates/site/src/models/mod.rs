//! Domain models for the site.
//!
//! These types represent validated domain objects separate from database row types.

pub mod comment;
pub mod hat;
pub mod story;
pub mod validation;

pub use comment::{Comment, NewComment};
pub use hat::Hat;
pub use story::{Story, StoryDocument};
pub use validation::ValidationErrors;
