use serde::{Deserialize, Serialize};

/// A normalized review record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Bubble rating in half steps, 0.0 to 5.0
    pub rating: f64,
    pub date_of_visit: String,
    pub rating_date: String,
    pub title: String,
    pub content: String,
}

/// The raw fragments of one review container, as found in the document
///
/// A fragment is `None` when its element (or attribute) is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReview {
    /// Class attribute of the rating element, e.g. `ui_bubble_rating bubble_45`
    pub rating_class: Option<String>,
    pub date_of_visit: Option<String>,
    /// Title attribute of the rating date element
    pub rating_date: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// What the first visit of a seed tells us about its listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorationSummary {
    /// Total number of reviews the listing reports
    pub total_count: u32,

    /// Absolute URL of a paginated page, when the listing has more than one page
    pub offset_template_url: Option<String>,
}
