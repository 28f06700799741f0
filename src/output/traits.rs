//! Result store trait and errors

use crate::input::Seed;
use crate::output::result::CrawlResult;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a seed's result
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Destination for per-seed crawl results
///
/// One result is written per seed, after all of its pages were scraped.
pub trait ResultStore {
    /// Where the result for `seed` lives (or will live)
    fn output_path(&self, seed: &Seed) -> PathBuf;

    /// Returns true if a result for `seed` was already written
    fn exists(&self, seed: &Seed) -> bool {
        self.output_path(seed).is_file()
    }

    /// Persists the result for `seed` and returns the written path
    fn write(&self, seed: &Seed, result: &CrawlResult) -> StoreResult<PathBuf>;
}
