//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! lobsters migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LOBSTERS_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/site/migrations/` and are embedded at build time:
//! ```text
//! migrations/
//! ├── 20261019000001_create_users.sql
//! ├── 20261019000002_create_hats.sql
//! ├── 20261019000003_create_stories.sql
//! └── 20261019000004_create_comments.sql
//! ```

use lobsters_site::error::AppError;
use lobsters_site::state::AppState;

/// Run site database migrations.
///
/// # Errors
///
/// Returns `AppError::Migration` if any migration fails to apply.
pub async fn run(state: &AppState) -> Result<(), AppError> {
    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations")
        .run(state.pool())
        .await?;
    tracing::info!("Site migrations complete!");
    Ok(())
}
