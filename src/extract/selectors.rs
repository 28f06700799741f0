//! Selectors and readiness predicates for review listing pages

/// Present once the document has been parsed
pub const BODY: &str = "body";

/// The "all languages" review filter
pub const LANGUAGE_FILTER_ALL: &str = "[id=filters_detail_language_filterLang_ALL]";

/// The "More" link expanding truncated review text
pub const EXPAND_REVIEWS: &str = ".taLnk.ulBlueLinks";

/// Header holding the total review count, e.g. `Reviews (1,234)`
pub const REVIEW_COUNT: &str = ".reviews_header_count";

/// Pagination links; the one at index 1 points at the second page
pub const PAGE_NUMBER: &str = ".pageNum";

pub const REVIEW_CONTAINER: &str = ".review-container";
pub const RATING: &str = ".ui_bubble_rating";
pub const DATE_OF_VISIT: &str = ".prw_rup.prw_reviews_stay_date_hsx";
pub const RATING_DATE: &str = ".ratingDate";
pub const TITLE: &str = ".noQuotes";
pub const CONTENT: &str = ".partial_entry";

/// Holds once the language filter input is checked (or is gone)
pub const LANGUAGE_FILTER_APPLIED: &str = r#"(el => !el || el.checked === true)(document.querySelector("[id=filters_detail_language_filterLang_ALL]"))"#;

/// Holds once expanded review text is rendered
pub const EXPANDED_TEXT_VISIBLE: &str =
    r#"document.querySelector("body").innerText.includes("Show less")"#;

/// Returns the rendered document as HTML
pub const SNAPSHOT_SCRIPT: &str = "return document.documentElement.outerHTML;";

/// Script reporting whether an element matching `selector` exists
pub fn presence_script(selector: &str) -> String {
    format!(
        "return document.querySelector({}) !== null;",
        serde_json::Value::from(selector)
    )
}
