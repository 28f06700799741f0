//! Review-Harvest: paginated review scraping through a headless browser
//!
//! This crate turns a list of seed listing pages into one JSON file of review
//! records per seed. For every seed it reads the total review count, derives the
//! full list of paginated URLs up front, visits each page once through a browser
//! session and normalizes the review fragments it finds.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod input;
pub mod output;
pub mod pagination;
pub mod state;

use thiserror::Error;

/// Main error type for Review-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse seed list: {0}")]
    SeedList(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Review-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Orchestrator, SeedError};
pub use extract::{ExplorationSummary, Review};
pub use input::Seed;
pub use output::{CrawlResult, JsonFileStore, ResultStore, RunReport};
pub use pagination::{sequence, PageUrlSequence, PAGE_SIZE};
pub use state::SeedState;
