//! Per-seed crawl orchestration
//!
//! Seeds are processed strictly in input order. For each one:
//! explore (own session) → sequence → scrape every page (one shared session)
//! → aggregate → persist. A failing seed is reported and skipped; it never
//! stops the run.

use crate::browser::{Browser, BrowserSession, Page};
use crate::config::CrawlerConfig;
use crate::crawler::error::SeedError;
use crate::crawler::retry::RetryPolicy;
use crate::extract::{ExplorationSummary, ExtractError, PageContentExtractor};
use crate::input::Seed;
use crate::output::{CrawlResult, Diagnostic, ResultStore, RunReport, SeedFailure, SeedOutcome};
use crate::pagination::{sequence, PageUrl};
use crate::state::{SeedRun, SeedState};
use std::future::Future;

/// Drives seeds through the browser and into the result store
pub struct Orchestrator<B: Browser, S: ResultStore> {
    browser: B,
    store: S,
    extractor: PageContentExtractor,
    retry: RetryPolicy,
    resume: bool,
}

impl<B: Browser, S: ResultStore> Orchestrator<B, S> {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Crawler section of the configuration (retry policy)
    /// * `browser` - Browser used to open one session per seed phase
    /// * `store` - Destination for per-seed results
    pub fn new(config: &CrawlerConfig, browser: B, store: S) -> Self {
        Self {
            browser,
            store,
            extractor: PageContentExtractor::new(),
            retry: RetryPolicy::from_config(config),
            resume: false,
        }
    }

    /// Skips seeds whose result already exists in the store
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Processes every seed in order and reports what happened to each
    pub async fn run(&self, seeds: &[Seed]) -> RunReport {
        let mut report = RunReport::new();
        tracing::info!("Starting harvest of {} seeds", seeds.len());

        for seed in seeds {
            tracing::info!("Now processing seed {}: {}", seed.position, seed.url);
            let mut run = SeedRun::new(seed);

            match self.process_seed(seed, &mut run).await {
                Ok(outcome) => report.record(outcome),
                Err(err) => {
                    run.fail();
                    tracing::error!(
                        position = seed.position,
                        url = %seed.url,
                        kind = err.kind(),
                        "Seed failed: {}",
                        err
                    );
                    report.record(SeedOutcome::bare(seed.position, &seed.url, run.state()));
                    report.record_failure(SeedFailure {
                        position: seed.position,
                        url: seed.url.clone(),
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        report.finish();
        tracing::info!(
            "Harvest complete: {} persisted, {} failed, {} skipped, {} reviews",
            report.persisted(),
            report.failed(),
            report.skipped(),
            report.reviews_collected()
        );
        report
    }

    async fn process_seed(&self, seed: &Seed, run: &mut SeedRun) -> Result<SeedOutcome, SeedError> {
        seed.validate()?;

        if self.resume && self.store.exists(seed) {
            run.advance(SeedState::Skipped)?;
            let path = self.store.output_path(seed);
            tracing::info!("Skipping seed {}: {} exists", seed.position, path.display());
            let mut outcome = SeedOutcome::bare(seed.position, &seed.url, run.state());
            outcome.output_file = Some(path.display().to_string());
            return Ok(outcome);
        }

        run.advance(SeedState::Exploring)?;
        let summary = self.explore(seed).await?;
        tracing::info!(
            "Seed {} reports {} reviews{}",
            seed.position,
            summary.total_count,
            if summary.offset_template_url.is_some() {
                ""
            } else {
                " on a single page"
            }
        );

        run.advance(SeedState::Sequencing)?;
        let pages = sequence(
            &seed.url,
            summary.total_count,
            summary.offset_template_url.as_deref(),
        );

        let mut diagnostics = Vec::new();
        for warning in pages.integrity_warnings() {
            tracing::warn!(position = seed.position, "Page sequence: {}", warning);
            diagnostics.push(Diagnostic::SequenceIntegrity {
                message: warning.to_string(),
            });
        }
        let pages = pages.distinct();
        tracing::info!("Seed {}: {} pages to visit", seed.position, pages.len());

        run.advance(SeedState::Scraping)?;
        let mut session = self.launch(seed).await?;
        let result = self
            .scrape_and_persist(seed, run, &mut *session, &pages, &summary, diagnostics)
            .await;
        self.close(&mut *session, seed).await;

        result
    }

    /// Reads the review count and offset template in a session of its own
    async fn explore(&self, seed: &Seed) -> Result<ExplorationSummary, SeedError> {
        let mut session = self.launch(seed).await?;

        let result = match session.new_page().await {
            Ok(page) => {
                let page: &dyn Page = &*page;
                self.with_retry(&seed.url, move || {
                    self.extractor.explore(page, &seed.url)
                })
                .await
            }
            Err(e) => Err(SeedError::from_browser(&seed.url, e)),
        };

        self.close(&mut *session, seed).await;
        result
    }

    async fn scrape_and_persist(
        &self,
        seed: &Seed,
        run: &mut SeedRun,
        session: &mut dyn BrowserSession,
        pages: &[PageUrl],
        summary: &ExplorationSummary,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Result<SeedOutcome, SeedError> {
        let page = session
            .new_page()
            .await
            .map_err(|e| SeedError::from_browser(&seed.url, e))?;
        let page: &dyn Page = &*page;

        let mut reviews = Vec::new();
        for (index, page_url) in pages.iter().enumerate() {
            let pages_left = pages.len() - 1 - index;
            let scraped = self
                .with_retry(&page_url.url, move || {
                    self.extractor.scrape(page, &page_url.url, pages_left)
                })
                .await?;

            for rejected in scraped.rejected {
                diagnostics.push(Diagnostic::MalformedReview {
                    page: index,
                    url: scraped.url.clone(),
                    index: rejected.index,
                    field: rejected.error.field().to_string(),
                    message: rejected.error.to_string(),
                });
            }
            reviews.extend(scraped.reviews);
        }

        run.advance(SeedState::Aggregating)?;
        let result = CrawlResult::new(summary.total_count, reviews, seed.position, diagnostics);
        if result.has_count_mismatch() {
            tracing::warn!(
                position = seed.position,
                "Listing reported {} reviews but {} were collected",
                result.expected_count,
                result.actual_count
            );
        }

        let path = self.store.write(seed, &result)?;
        run.advance(SeedState::Persisted)?;
        tracing::info!(
            "Seed {}: wrote {} reviews to {}",
            seed.position,
            result.actual_count,
            path.display()
        );

        Ok(SeedOutcome {
            position: seed.position,
            url: seed.url.clone(),
            state: run.state(),
            expected_count: Some(result.expected_count),
            actual_count: Some(result.actual_count),
            output_file: Some(path.display().to_string()),
            diagnostics: result.diagnostics.len(),
        })
    }

    async fn launch(&self, seed: &Seed) -> Result<Box<dyn BrowserSession>, SeedError> {
        self.browser
            .launch()
            .await
            .map_err(|e| SeedError::from_browser(&seed.url, e))
    }

    async fn close(&self, session: &mut dyn BrowserSession, seed: &Seed) {
        if let Err(e) = session.close().await {
            tracing::warn!(
                position = seed.position,
                "Failed to close browser session: {}",
                e
            );
        }
    }

    /// Runs a page operation, retrying transient failures with backoff
    async fn with_retry<T, F, Fut>(&self, url: &str, mut operation: F) -> Result<T, SeedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExtractError>>,
    {
        let mut retries = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => SeedError::from_extract(url, e),
            };

            if !err.is_retryable() || !self.retry.should_retry(retries) {
                return Err(err);
            }

            retries += 1;
            let delay = self.retry.delay_for(retries);
            tracing::warn!(
                "Attempt {} on {} failed ({}), retrying in {:?}",
                retries,
                url,
                err,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
