/// Seed state definitions for tracking crawl progress
///
/// This module defines every state a seed can be in while it is being harvested.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a seed in the harvest process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedState {
    // ===== Active States =====
    /// Seed has been accepted but no browser work has started
    Init,

    /// The seed page is loaded to read the review count and pagination link
    Exploring,

    /// The page URL sequence is being derived
    Sequencing,

    /// Review pages are being visited
    Scraping,

    /// Reviews from every page are being assembled into a result
    Aggregating,

    // ===== Terminal States =====
    /// The result file for the seed has been written
    Persisted,

    /// The seed was abandoned after an unrecovered error
    Failed,

    /// The seed already had an output file and resume was requested
    Skipped,
}

impl SeedState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Failed | Self::Skipped)
    }

    /// Returns true if a seed in this state may move to `next`
    ///
    /// The happy path is strictly linear. Failure is reachable from every
    /// phase that talks to the browser or the output directory, and from
    /// `Init` when the seed URL is unusable. Skipping is only decided before
    /// any work starts.
    pub fn can_transition_to(&self, next: SeedState) -> bool {
        use SeedState::*;
        matches!(
            (self, next),
            (Init, Exploring)
                | (Init, Skipped)
                | (Init, Failed)
                | (Exploring, Sequencing)
                | (Exploring, Failed)
                | (Sequencing, Scraping)
                | (Scraping, Aggregating)
                | (Scraping, Failed)
                | (Aggregating, Persisted)
                | (Aggregating, Failed)
        )
    }

    /// Converts the state to its string representation used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Exploring => "exploring",
            Self::Sequencing => "sequencing",
            Self::Scraping => "scraping",
            Self::Aggregating => "aggregating",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a state from its string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all_states().into_iter().find(|state| state.as_str() == s)
    }

    /// Returns all possible seed states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Init,
            Self::Exploring,
            Self::Sequencing,
            Self::Scraping,
            Self::Aggregating,
            Self::Persisted,
            Self::Failed,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for SeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
