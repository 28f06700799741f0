//! Field normalization for raw review fragments

use crate::extract::types::{RawReview, Review};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const DATE_OF_VISIT_LABEL: &str = "Date of visit:";

/// Fields of a review, used to name what failed to normalize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewField {
    Rating,
    DateOfVisit,
    RatingDate,
    Title,
    Content,
}

impl ReviewField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewField::Rating => "rating",
            ReviewField::DateOfVisit => "dateOfVisit",
            ReviewField::RatingDate => "ratingDate",
            ReviewField::Title => "title",
            ReviewField::Content => "content",
        }
    }
}

impl fmt::Display for ReviewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a single review could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed rating class {raw:?}")]
    MalformedRating { raw: String },

    #[error("missing field {field}")]
    MalformedField { field: ReviewField },
}

impl NormalizeError {
    /// The field this error is about
    pub fn field(&self) -> ReviewField {
        match self {
            NormalizeError::MalformedRating { .. } => ReviewField::Rating,
            NormalizeError::MalformedField { field } => *field,
        }
    }
}

fn digit_run_regex() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"))
}

/// Parses a bubble rating class such as `ui_bubble_rating bubble_45` into 4.5
///
/// The longest digit run is the rating in tenths; only half steps from 0 to 50
/// are accepted.
///
/// # Examples
///
/// ```
/// use review_harvest::extract::parse_rating;
///
/// assert_eq!(parse_rating("ui_bubble_rating bubble_45").unwrap(), 4.5);
/// assert!(parse_rating("ui_bubble_rating").is_err());
/// ```
pub fn parse_rating(class_attr: &str) -> Result<f64, NormalizeError> {
    let malformed = || NormalizeError::MalformedRating {
        raw: class_attr.to_string(),
    };

    // max_by_key keeps the last of equal lengths; the first run wins instead
    let digits = digit_run_regex()
        .find_iter(class_attr)
        .fold(None::<&str>, |best, m| match best {
            Some(b) if b.len() >= m.as_str().len() => Some(b),
            _ => Some(m.as_str()),
        })
        .ok_or_else(malformed)?;

    let tenths: u32 = digits.parse().map_err(|_| malformed())?;
    if tenths > 50 || tenths % 5 != 0 {
        return Err(malformed());
    }

    Ok(f64::from(tenths) / 10.0)
}

/// Trimmed text of an element that must exist; empty text is kept
fn required(value: Option<&str>, field: ReviewField) -> Result<String, NormalizeError> {
    value
        .map(|v| v.trim().to_string())
        .ok_or(NormalizeError::MalformedField { field })
}

/// Normalizes one review's raw fragments
///
/// Fields are checked in output order, so the error names the first failing field.
pub fn normalize(raw: &RawReview) -> Result<Review, NormalizeError> {
    let rating_class = raw
        .rating_class
        .as_deref()
        .ok_or(NormalizeError::MalformedField {
            field: ReviewField::Rating,
        })?;
    let rating = parse_rating(rating_class)?;

    let visit = required(raw.date_of_visit.as_deref(), ReviewField::DateOfVisit)?;
    let date_of_visit = visit
        .strip_prefix(DATE_OF_VISIT_LABEL)
        .unwrap_or(&visit)
        .trim()
        .to_string();

    // Passed through as found; only presence is required
    let rating_date = raw
        .rating_date
        .clone()
        .ok_or(NormalizeError::MalformedField {
            field: ReviewField::RatingDate,
        })?;

    Ok(Review {
        rating,
        date_of_visit,
        rating_date,
        title: required(raw.title.as_deref(), ReviewField::Title)?,
        content: required(raw.content.as_deref(), ReviewField::Content)?,
    })
}
