//! Live page reading
//!
//! Drives a browser page through readiness waits and the review interactions,
//! then hands a snapshot of the rendered HTML to the document parser.

use crate::browser::{BrowserError, Page, WaitUntil};
use crate::extract::document::{parse_fragments, parse_summary, DocumentError};
use crate::extract::normalize::{normalize, NormalizeError};
use crate::extract::selectors;
use crate::extract::types::{ExplorationSummary, Review};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("page snapshot was not a string but {0}")]
    Snapshot(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A review container that was found but could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedReview {
    /// Position of the container on its page
    pub index: usize,
    pub error: NormalizeError,
}

/// Reviews read from one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageReviews {
    /// Location the browser ended up at
    pub url: String,
    /// Normalized reviews, in document order
    pub reviews: Vec<Review>,
    pub rejected: Vec<RejectedReview>,
}

/// Reads listing pages through the browser contract
///
/// Every visit runs the same sequence: wait for the body, switch the review
/// filter to all languages and expand truncated reviews, then snapshot the
/// rendered document. Interactions whose element is absent are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContentExtractor;

impl PageContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Waits for the document and applies the page interactions
    pub async fn prepare(&self, page: &dyn Page) -> Result<(), ExtractError> {
        page.wait_for_selector(selectors::BODY).await?;

        self.interact(
            page,
            selectors::LANGUAGE_FILTER_ALL,
            selectors::LANGUAGE_FILTER_APPLIED,
        )
        .await?;
        self.interact(
            page,
            selectors::EXPAND_REVIEWS,
            selectors::EXPANDED_TEXT_VISIBLE,
        )
        .await?;

        Ok(())
    }

    /// Clicks `selector` if present, then waits for `predicate`
    async fn interact(
        &self,
        page: &dyn Page,
        selector: &str,
        predicate: &str,
    ) -> Result<(), ExtractError> {
        let present = page
            .evaluate(&selectors::presence_script(selector))
            .await?
            .as_bool()
            .unwrap_or(false);

        if !present {
            tracing::debug!("No {} on page, skipping", selector);
            return Ok(());
        }

        page.click(selector).await?;
        page.wait_for_function(predicate).await?;
        Ok(())
    }

    async fn snapshot(&self, page: &dyn Page) -> Result<String, ExtractError> {
        match page.evaluate(selectors::SNAPSHOT_SCRIPT).await? {
            Value::String(html) => Ok(html),
            other => Err(ExtractError::Snapshot(other.to_string())),
        }
    }

    /// Visits the seed page and reads its review count and offset template
    pub async fn explore(
        &self,
        page: &dyn Page,
        url: &str,
    ) -> Result<ExplorationSummary, ExtractError> {
        page.goto(url, WaitUntil::Load).await?;
        self.prepare(page).await?;

        let html = self.snapshot(page).await?;
        let current = page.url().await?;
        Ok(parse_summary(&html, &current)?)
    }

    /// Visits one page of the sequence and normalizes its reviews
    ///
    /// # Arguments
    ///
    /// * `page` - Page of the seed's scraping session
    /// * `url` - Page URL from the sequence
    /// * `pages_left` - Pages remaining after this one, for progress logging
    pub async fn scrape(
        &self,
        page: &dyn Page,
        url: &str,
        pages_left: usize,
    ) -> Result<PageReviews, ExtractError> {
        page.goto(url, WaitUntil::NetworkIdle).await?;
        self.prepare(page).await?;

        let current = page.url().await?;
        tracing::info!("Scraping: {} | {} pages left", current, pages_left);

        let html = self.snapshot(page).await?;
        let mut reviews = Vec::new();
        let mut rejected = Vec::new();

        for (index, raw) in parse_fragments(&html)?.iter().enumerate() {
            match normalize(raw) {
                Ok(review) => reviews.push(review),
                Err(error) => {
                    tracing::warn!("Skipping review {} on {}: {}", index, current, error);
                    rejected.push(RejectedReview { index, error });
                }
            }
        }

        Ok(PageReviews {
            url: current,
            reviews,
            rejected,
        })
    }
}
