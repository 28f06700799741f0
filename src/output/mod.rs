//! Output module: per-seed result files and run summaries
//!
//! This module handles:
//! - The `CrawlResult` aggregate and its JSON shape
//! - Persisting results through the `ResultStore` trait (`JsonFileStore`)
//! - The run report and statistics over an existing data directory

mod report;
mod result;
pub mod stats;
mod store;
mod traits;

pub use report::{write_report, RunReport, SeedFailure, SeedOutcome};
pub use result::{CrawlResult, Diagnostic};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use store::{derive_slug, file_name_for, JsonFileStore};
pub use traits::{ResultStore, StoreError, StoreResult};
