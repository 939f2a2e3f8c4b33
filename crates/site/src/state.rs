//! Application state shared across commands.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::CommentRepository;
use crate::search::StoryIndex;
use crate::services::{CommentService, RecentMentionFinder};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    story_index: StoryIndex,
}

impl AppState {
    /// Create a new application state with an empty story index.
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                story_index: StoryIndex::new(),
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the story search index.
    #[must_use]
    pub fn story_index(&self) -> &StoryIndex {
        &self.inner.story_index
    }

    /// Mention finder backed by the comments table.
    #[must_use]
    pub fn mention_finder(&self) -> RecentMentionFinder<CommentRepository<'_>> {
        RecentMentionFinder::new(CommentRepository::new(self.pool()))
    }

    /// Comment posting service.
    #[must_use]
    pub fn comment_service(&self) -> CommentService<'_> {
        CommentService::new(self.pool())
    }
}
