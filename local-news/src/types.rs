use crate::aggregators::stats::DEFAULT_TOP_LIMIT;
use crate::validation::FormErrors;
use std::env;

// Use the interfaces crate for core types
pub use interfaces::defs::{
    ModerationResult, NewsFilters, NewsItem, RejectionKind, SubmissionDraft, APPROVAL_REASON,
    KNOWN_TOPICS,
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://local_news.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub moderation_delay_ms: u64,
    pub top_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            moderation_delay_ms: 2000, // Simulated editor latency
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl AppConfig {
    /// Build config from `LOCAL_NEWS_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("LOCAL_NEWS_DATABASE_URL").unwrap_or(defaults.database_url),
            moderation_delay_ms: env::var("LOCAL_NEWS_MODERATION_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.moderation_delay_ms),
            top_limit: env::var("LOCAL_NEWS_TOP_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_limit),
        }
    }
}

/// Result of pushing a draft through the submission pipeline.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Published(NewsItem),
    Rejected { kind: RejectionKind, reason: String },
}

impl SubmissionOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, SubmissionOutcome::Published(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to validate news. Please try again later.")]
    ValidationFailed,

    #[error("Invalid submission: {0}")]
    InvalidSubmission(FormErrors),

    #[error("News item not found: {id}")]
    NewsNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, NewsError>;
