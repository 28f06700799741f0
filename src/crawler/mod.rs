//! Crawler module: seed orchestration, retries and failure classification

mod error;
mod orchestrator;
mod retry;

pub use error::SeedError;
pub use orchestrator::Orchestrator;
pub use retry::RetryPolicy;

use crate::browser::{ReadinessPolicy, WebDriverBrowser};
use crate::config::Config;
use crate::input::Seed;
use crate::output::{JsonFileStore, RunReport};
use crate::HarvestError;

/// Runs a complete harvest against the configured WebDriver server
///
/// # Arguments
///
/// * `config` - Loaded and validated configuration
/// * `seeds` - Seeds in input order
/// * `resume` - Skip seeds whose output file already exists
///
/// # Returns
///
/// * `Ok(RunReport)` - The run finished; individual seeds may still have failed
/// * `Err(HarvestError)` - The browser client could not be built
pub async fn run_harvest(
    config: &Config,
    seeds: &[Seed],
    resume: bool,
) -> Result<RunReport, HarvestError> {
    let readiness = ReadinessPolicy::from_config(&config.crawler);
    let browser = WebDriverBrowser::new(&config.browser, readiness)?;
    let store = JsonFileStore::new(&config.output.data_dir);

    let orchestrator = Orchestrator::new(&config.crawler, browser, store).with_resume(resume);
    Ok(orchestrator.run(seeds).await)
}
