//! Parsing of rendered page snapshots
//!
//! The live page is snapshotted once its interactions are done; everything
//! below works on that HTML with `scraper`, so it can be tested without a browser.

use crate::extract::selectors;
use crate::extract::types::{ExplorationSummary, RawReview};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// A snapshot that cannot be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("invalid selector {0}")]
    InvalidSelector(String),

    #[error("review count header has no parenthesised count: {0:?}")]
    MalformedCount(String),
}

fn selector(css: &str) -> Result<Selector, DocumentError> {
    Selector::parse(css).map_err(|_| DocumentError::InvalidSelector(css.to_string()))
}

/// Reads the total review count and the offset template from a listing snapshot
///
/// A page without the count header reports zero reviews. The template is the
/// second pagination link, resolved against `page_url`.
///
/// # Examples
///
/// ```
/// use review_harvest::extract::parse_summary;
///
/// let html = r#"<html><body>
///     <span class="reviews_header_count">(1,234)</span>
///     <a class="pageNum" href="/R-g1-d2-Reviews-Name.html">1</a>
///     <a class="pageNum" href="/R-g1-d2-Reviews-or15-Name.html">2</a>
/// </body></html>"#;
///
/// let summary = parse_summary(html, "https://example.com/R-g1-d2-Reviews-Name.html").unwrap();
/// assert_eq!(summary.total_count, 1234);
/// assert_eq!(
///     summary.offset_template_url.as_deref(),
///     Some("https://example.com/R-g1-d2-Reviews-or15-Name.html")
/// );
/// ```
pub fn parse_summary(html: &str, page_url: &str) -> Result<ExplorationSummary, DocumentError> {
    let document = Html::parse_document(html);

    let total_count = match document.select(&selector(selectors::REVIEW_COUNT)?).next() {
        Some(header) => parse_count(&element_text(&header))?,
        None => 0,
    };

    let offset_template_url = document
        .select(&selector(selectors::PAGE_NUMBER)?)
        .nth(1)
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href));

    Ok(ExplorationSummary {
        total_count,
        offset_template_url,
    })
}

/// Parses a count header such as `Reviews (1,234)`
fn parse_count(text: &str) -> Result<u32, DocumentError> {
    let malformed = || DocumentError::MalformedCount(text.to_string());

    let inner = text
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(malformed)?;

    let digits: String = inner
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | '\u{a0}' | '\u{202f}') && !c.is_whitespace())
        .collect();

    digits.parse().map_err(|_| malformed())
}

fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::debug!("Ignoring pagination href {}: {}", href, e);
            None
        }
    }
}

/// Collects the raw fragments of every review container, in document order
pub fn parse_fragments(html: &str) -> Result<Vec<RawReview>, DocumentError> {
    let document = Html::parse_document(html);

    let container = selector(selectors::REVIEW_CONTAINER)?;
    let rating = selector(selectors::RATING)?;
    let date_of_visit = selector(selectors::DATE_OF_VISIT)?;
    let rating_date = selector(selectors::RATING_DATE)?;
    let title = selector(selectors::TITLE)?;
    let content = selector(selectors::CONTENT)?;

    let reviews = document
        .select(&container)
        .map(|item| RawReview {
            rating_class: first(&item, &rating).and_then(|e| attr(&e, "class")),
            date_of_visit: first(&item, &date_of_visit).map(|e| element_text(&e)),
            rating_date: first(&item, &rating_date).and_then(|e| attr(&e, "title")),
            title: first(&item, &title).map(|e| element_text(&e)),
            content: first(&item, &content).map(|e| element_text(&e)),
        })
        .collect();

    Ok(reviews)
}

fn first<'a>(item: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    item.select(selector).next()
}

fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// Text content with whitespace runs collapsed, close to what `innerText` shows
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
