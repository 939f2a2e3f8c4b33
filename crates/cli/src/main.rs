//! Lobsters CLI - Database migrations, mention lookups and story search.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lobsters migrate
//!
//! # Comments from the last 48 hours linking to a URL
//! lobsters mentions https://example.com/post --hours 48
//!
//! # Search stories, hottest first
//! lobsters search "rust async" --sort hottest --limit 10
//!
//! # Post a comment as user 1 on story 7, wearing hat 3
//! lobsters comment --user 1 --story 7 --hat 3 "Thanks for sharing"
//!
//! # Print the story index definition as JSON
//! lobsters index-schema
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lobsters_site::config::{ConfigError, SiteConfig};
use lobsters_site::db;
use lobsters_site::error::AppError;
use lobsters_site::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lobsters")]
#[command(author, version, about = "Lobsters CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// List recent comments that link to a URL
    Mentions {
        /// URL to look for, matched literally
        url: String,

        /// Hours to look back (defaults to `MENTION_WINDOW_HOURS`)
        #[arg(long)]
        hours: Option<u32>,
    },
    /// Search stories
    Search {
        /// Search terms
        query: String,

        /// Result order (`relevance`, `newest`, `hottest`, `score`)
        #[arg(short, long, default_value = "relevance")]
        sort: String,

        /// Maximum results (defaults to `SEARCH_RESULT_LIMIT`)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Post a comment
    Comment {
        /// Author user ID
        #[arg(short, long)]
        user: i32,

        /// Story ID
        #[arg(long)]
        story: i32,

        /// Comment ID being replied to
        #[arg(short, long)]
        parent: Option<i32>,

        /// Hat ID to wear
        #[arg(long)]
        hat: Option<i32>,

        /// Explicit short id
        #[arg(long)]
        short_id: Option<String>,

        /// Markdown body
        body: String,
    },
    /// Print the story search index definition as JSON
    IndexSchema,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = SiteConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lobsters_site=info,lobsters_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Result<SiteConfig, ConfigError>) -> Result<(), AppError> {
    // The schema export needs neither configuration nor a database
    if matches!(cli.command, Commands::IndexSchema) {
        return commands::index_schema::print();
    }

    let config = config?;
    let pool = db::create_pool(&config.database_url).await?;
    tracing::debug!("Database pool created");
    let state = AppState::new(config, pool);

    match cli.command {
        Commands::Migrate => commands::migrate::run(&state).await,
        Commands::Mentions { url, hours } => commands::mentions::run(&state, &url, hours).await,
        Commands::Search { query, sort, limit } => {
            commands::search::run(&state, &query, &sort, limit).await
        }
        Commands::Comment {
            user,
            story,
            parent,
            hat,
            short_id,
            body,
        } => {
            let args = commands::comment::CommentArgs {
                user,
                story,
                parent,
                hat,
                short_id,
                body,
            };
            commands::comment::run(&state, args).await
        }
        Commands::IndexSchema => commands::index_schema::print(),
    }
}
