//! Unified error handling with Sentry integration.
//!
//! Provides `AppError`, the error every site operation surfaces to the
//! command line, and captures server-side failures to Sentry when reported.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::search::SearchError;
use crate::services::PostError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Could not connect to or migrate the database.
    #[error("Database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Search index operation failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Posting a comment failed.
    #[error("Comment error: {0}")]
    Post(#[from] PostError),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad request from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the error originates on our side rather than in user input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Connection(_)
            | Self::Migration(_)
            | Self::Database(_)
            | Self::Serialization(_)
            | Self::Search(_)
            | Self::Post(PostError::Repository(_)) => true,
            Self::Config(_) | Self::Post(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing server-side failures to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Command failed");
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lobsters_core::{HatId, ShortId};

    use super::*;
    use crate::models::ValidationErrors;

    #[test]
    fn test_server_errors() {
        assert!(
            AppError::from(RepositoryError::DataCorruption("bad row".into())).is_server_error()
        );
        assert!(AppError::from(SearchError::Query("boom".into())).is_server_error());
        assert!(
            AppError::from(PostError::Repository(RepositoryError::Conflict("x".into())))
                .is_server_error()
        );
    }

    #[test]
    fn test_user_errors() {
        assert!(!AppError::from(PostError::Invalid(ValidationErrors::new())).is_server_error());
        let taken = ShortId::parse("abc123").unwrap();
        assert!(!AppError::from(PostError::ShortIdTaken(taken)).is_server_error());
        assert!(!AppError::from(PostError::HatNotFound(HatId::new(1))).is_server_error());
        assert!(!AppError::BadRequest("nope".into()).is_server_error());
        assert!(
            !AppError::from(ConfigError::MissingEnvVar("DATABASE_URL".into())).is_server_error()
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::BadRequest("empty query".into()).to_string(),
            "Bad request: empty query"
        );
    }
}
