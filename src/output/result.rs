use crate::extract::Review;
use serde::{Deserialize, Serialize};

/// Something worth knowing about a seed that did not stop it from completing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A review container that could not be normalized and was left out
    MalformedReview {
        /// Index of the page in the visited sequence
        page: usize,
        url: String,
        /// Index of the container on its page
        index: usize,
        field: String,
        message: String,
    },

    /// The derived page sequence looked wrong (duplicates, missing markers)
    SequenceIntegrity { message: String },
}

/// Aggregate of everything scraped for one seed
///
/// Serialized as `{ "count", "actualCount", "allReviews", "position" }`, plus
/// `diagnostics` when there are any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Total the listing reported
    #[serde(rename = "count")]
    pub expected_count: u32,

    /// Number of reviews actually collected
    #[serde(rename = "actualCount")]
    pub actual_count: usize,

    #[serde(rename = "allReviews")]
    pub reviews: Vec<Review>,

    pub position: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl CrawlResult {
    pub fn new(
        expected_count: u32,
        reviews: Vec<Review>,
        position: usize,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            expected_count,
            actual_count: reviews.len(),
            reviews,
            position,
            diagnostics,
        }
    }

    /// The site reported a different total than what was collected
    pub fn has_count_mismatch(&self) -> bool {
        self.actual_count != self.expected_count as usize
    }
}
