//! Pagination module for Review-Harvest
//!
//! The review site encodes the position of the first review shown on a page
//! directly in the page URL (`…-Reviews-or30-…` shows reviews 31 to 45). Given the
//! total review count and the URL of any paginated page, every page URL of a
//! listing can therefore be computed up front instead of following "next" links.

mod marker;
mod sequence;

/// Number of reviews the site shows per paginated view
pub const PAGE_SIZE: u32 = 15;

// Re-export main functions
pub use marker::{apply_offset, has_marker, offset_of};
pub use sequence::{page_count, sequence, PageUrl, PageUrlSequence, SequenceIntegrityWarning};
