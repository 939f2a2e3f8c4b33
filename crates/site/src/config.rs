//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LOBSTERS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MENTION_WINDOW_HOURS` - Trailing window scanned for URL mentions (default: 48)
//! - `SEARCH_RESULT_LIMIT` - Maximum stories returned per search (default: 25)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (e.g. production)

use std::num::NonZeroUsize;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::mentions::MentionWindow;

const DEFAULT_SEARCH_RESULT_LIMIT: usize = 25;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Window used when looking for recent URL mentions
    pub mention_window: MentionWindow,
    /// Maximum number of stories returned by a search
    pub search_result_limit: NonZeroUsize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LOBSTERS_DATABASE_URL")?;
        let mention_window = parse_mention_window(
            "MENTION_WINDOW_HOURS",
            get_optional_env("MENTION_WINDOW_HOURS").as_deref(),
        )?;
        let search_result_limit = parse_search_result_limit(
            "SEARCH_RESULT_LIMIT",
            get_optional_env("SEARCH_RESULT_LIMIT").as_deref(),
        )?;

        Ok(Self {
            database_url,
            mention_window,
            search_result_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse the mention window, defaulting to 48 hours when unset.
fn parse_mention_window(key: &str, raw: Option<&str>) -> Result<MentionWindow, ConfigError> {
    let Some(raw) = raw else {
        return Ok(MentionWindow::default());
    };

    let hours = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    MentionWindow::from_hours(hours).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), "must be a positive number of hours".into())
    })
}

/// Parse the search result limit, defaulting to 25 when unset.
fn parse_search_result_limit(key: &str, raw: Option<&str>) -> Result<NonZeroUsize, ConfigError> {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
        None => DEFAULT_SEARCH_RESULT_LIMIT,
    };

    NonZeroUsize::new(value).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), "must be greater than zero".into())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_window_defaults_to_48_hours() {
        let window = parse_mention_window("MENTION_WINDOW_HOURS", None).unwrap();
        assert_eq!(window.hours(), 48);
    }

    #[test]
    fn test_mention_window_parses_hours() {
        let window = parse_mention_window("MENTION_WINDOW_HOURS", Some(" 72 ")).unwrap();
        assert_eq!(window.hours(), 72);
    }

    #[test]
    fn test_mention_window_rejects_zero() {
        let err = parse_mention_window("MENTION_WINDOW_HOURS", Some("0")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MENTION_WINDOW_HOURS"));
    }

    #[test]
    fn test_mention_window_rejects_garbage() {
        assert!(parse_mention_window("MENTION_WINDOW_HOURS", Some("-3")).is_err());
        assert!(parse_mention_window("MENTION_WINDOW_HOURS", Some("two days")).is_err());
    }

    #[test]
    fn test_search_result_limit() {
        assert_eq!(
            parse_search_result_limit("SEARCH_RESULT_LIMIT", None)
                .unwrap()
                .get(),
            25
        );
        assert_eq!(
            parse_search_result_limit("SEARCH_RESULT_LIMIT", Some("5"))
                .unwrap()
                .get(),
            5
        );
        assert!(parse_search_result_limit("SEARCH_RESULT_LIMIT", Some("0")).is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("LOBSTERS_DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: LOBSTERS_DATABASE_URL"
        );
    }
}
