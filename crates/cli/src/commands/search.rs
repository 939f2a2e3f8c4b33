//! Story search.
//!
//! Builds the story index from the database, then runs one query against it.
//!
//! # Usage
//!
//! ```bash
//! lobsters search "rust async"
//! lobsters search compilers --sort newest --limit 5
//! ```

use lobsters_site::error::AppError;
use lobsters_site::search::{self, StorySort};
use lobsters_site::state::AppState;

/// Print stories matching `query`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `query` is blank or `limit` is zero.
/// Returns `AppError::Search` if the index cannot be built or queried.
pub async fn run(
    state: &AppState,
    query: &str,
    sort: &str,
    limit: Option<usize>,
) -> Result<(), AppError> {
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be blank".to_string()));
    }
    let limit = match limit {
        Some(0) => return Err(AppError::BadRequest("--limit must be at least 1".to_string())),
        Some(n) => n,
        None => state.config().search_result_limit.get(),
    };
    let sort = StorySort::parse(sort);

    search::rebuild(state.story_index(), state.pool()).await?;
    let hits = state.story_index().search(query, sort, limit)?;
    tracing::info!(count = hits.len(), sort = sort.as_str(), "Search complete");

    #[allow(clippy::print_stdout)]
    {
        for hit in &hits {
            println!(
                "{}\t{:+}\t{}\t{}\t[{}]",
                hit.short_id,
                hit.score,
                hit.title,
                hit.url.as_deref().unwrap_or("-"),
                hit.tags.join(" ")
            );
        }
    }
    Ok(())
}
