//! Extraction module: from a live listing page to normalized reviews
//!
//! - `extractor`: drives readiness and interactions, snapshots the document
//! - `document`: parses snapshots into summaries and raw review fragments
//! - `normalize`: turns raw fragments into `Review` records
//! - `selectors`: CSS selectors and named readiness predicates

mod document;
mod extractor;
mod normalize;
pub mod selectors;
mod types;

pub use document::{parse_fragments, parse_summary, DocumentError};
pub use extractor::{ExtractError, PageContentExtractor, PageReviews, RejectedReview};
pub use normalize::{normalize, parse_rating, NormalizeError, ReviewField};
pub use types::{ExplorationSummary, RawReview, Review};
