//! Offset marker handling
//!
//! A paginated URL carries its offset as `-or<digits>`, e.g.
//! `Restaurant_Review-g1-d2-Reviews-or15-Name-City.html`.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"-or([0-9]+)").expect("offset marker pattern is valid"))
}

/// Returns true if the URL contains an offset marker
pub fn has_marker(url: &str) -> bool {
    marker_regex().is_match(url)
}

/// Replaces every offset marker in `template` with `offset`
///
/// A template without a marker is returned unchanged.
///
/// # Examples
///
/// ```
/// use review_harvest::pagination::apply_offset;
///
/// let url = apply_offset("https://example.com/R-g1-d2-Reviews-or10-Name.html", 45);
/// assert_eq!(url, "https://example.com/R-g1-d2-Reviews-or45-Name.html");
/// ```
pub fn apply_offset(template: &str, offset: u32) -> String {
    let replacement = format!("-or{}", offset);
    marker_regex()
        .replace_all(template, NoExpand(&replacement))
        .into_owned()
}

/// Reads the offset encoded in a URL, if it carries a marker
pub fn offset_of(url: &str) -> Option<u32> {
    marker_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}
