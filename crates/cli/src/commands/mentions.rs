//! Recent URL mention lookup.
//!
//! # Usage
//!
//! ```bash
//! lobsters mentions https://example.com/post
//! lobsters mentions https://example.com/post --hours 6
//! ```

use lobsters_site::error::AppError;
use lobsters_site::services::MentionWindow;
use lobsters_site::state::AppState;

/// Print comments from the trailing window whose body contains `url`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `hours` is zero.
/// Returns `AppError::Database` if comments cannot be loaded.
pub async fn run(state: &AppState, url: &str, hours: Option<u32>) -> Result<(), AppError> {
    let window = match hours {
        Some(hours) => MentionWindow::from_hours(hours)
            .ok_or_else(|| AppError::BadRequest("--hours must be at least 1".to_string()))?,
        None => state.config().mention_window,
    };

    let mentions = state
        .mention_finder()
        .find_mentions(Some(url), window)
        .await?;
    tracing::info!(count = mentions.len(), hours = window.hours(), "Found mentions");

    #[allow(clippy::print_stdout)]
    {
        for comment in &mentions {
            println!(
                "{}\tstory {}\tuser {}\t{}",
                comment.short_id,
                comment.story_id,
                comment.user_id,
                comment.created_at.to_rfc3339()
            );
        }
    }
    Ok(())
}
