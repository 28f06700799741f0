//! Run report: what happened to every seed of a run

use crate::state::SeedState;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A seed that failed, with enough context to retry it by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub position: usize,
    pub url: String,
    /// Error category, e.g. `navigation` or `content_timeout`
    pub kind: String,
    pub message: String,
}

/// Final state of one seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub position: usize,
    pub url: String,
    pub state: SeedState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default)]
    pub diagnostics: usize,
}

impl SeedOutcome {
    /// An outcome with no counts, for seeds that never reached aggregation
    pub fn bare(position: usize, url: &str, state: SeedState) -> Self {
        Self {
            position,
            url: url.to_string(),
            state,
            expected_count: None,
            actual_count: None,
            output_file: None,
            diagnostics: 0,
        }
    }
}

/// Summary of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    pub outcomes: Vec<SeedOutcome>,
    pub failures: Vec<SeedFailure>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: None,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn record(&mut self, outcome: SeedOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn record_failure(&mut self, failure: SeedFailure) {
        self.failures.push(failure);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    fn count_in(&self, state: SeedState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn persisted(&self) -> usize {
        self.count_in(SeedState::Persisted)
    }

    pub fn failed(&self) -> usize {
        self.count_in(SeedState::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count_in(SeedState::Skipped)
    }

    /// Total reviews written during this run
    pub fn reviews_collected(&self) -> usize {
        self.outcomes.iter().filter_map(|o| o.actual_count).sum()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the report as pretty-printed JSON
pub fn write_report(report: &RunReport, path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}
