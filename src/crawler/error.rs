use crate::browser::BrowserError;
use crate::extract::ExtractError;
use crate::input::SeedUrlError;
use crate::output::StoreError;
use crate::state::TransitionError;
use thiserror::Error;

/// Why a seed failed
///
/// Any of these discards the seed's accumulated reviews; nothing is written
/// for it and the run moves on to the next seed.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Seed cannot be visited: {0}")]
    InvalidUrl(#[from] SeedUrlError),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Page {url} did not become ready: {condition}")]
    ContentTimeout { url: String, condition: String },

    #[error("Could not read page {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Browser failure on {url}: {source}")]
    Browser {
        url: String,
        #[source]
        source: BrowserError,
    },

    #[error("Failed to persist result: {0}")]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    State(#[from] TransitionError),
}

impl SeedError {
    /// Short category name used in logs and the run report
    pub fn kind(&self) -> &'static str {
        match self {
            SeedError::InvalidUrl(_) => "invalid_url",
            SeedError::Navigation { .. } => "navigation",
            SeedError::ContentTimeout { .. } => "content_timeout",
            SeedError::Extraction { .. } => "extraction",
            SeedError::Browser { .. } => "browser",
            SeedError::Persistence(_) => "persistence",
            SeedError::State(_) => "internal",
        }
    }

    /// Navigation failures and timeouts are often transient and worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SeedError::Navigation { .. } | SeedError::ContentTimeout { .. }
        )
    }

    /// Classifies a browser error raised while working on `url`
    pub fn from_browser(url: &str, error: BrowserError) -> Self {
        match error {
            BrowserError::Navigation { url, message } => SeedError::Navigation { url, message },
            BrowserError::Timeout { condition, .. } => SeedError::ContentTimeout {
                url: url.to_string(),
                condition,
            },
            source => SeedError::Browser {
                url: url.to_string(),
                source,
            },
        }
    }

    /// Classifies an extraction error raised while reading `url`
    pub fn from_extract(url: &str, error: ExtractError) -> Self {
        match error {
            ExtractError::Browser(e) => Self::from_browser(url, e),
            other => SeedError::Extraction {
                url: url.to_string(),
                message: other.to_string(),
            },
        }
    }
}
