//! Integration tests for the harvest pipeline
//!
//! Most tests drive the orchestrator through an in-memory scripted browser.
//! The last one runs the real WebDriver backend against a wiremock server.

mod support;

use review_harvest::browser::{ReadinessPolicy, WaitUntil, WebDriverBrowser};
use review_harvest::config::{BrowserConfig, CrawlerConfig};
use review_harvest::extract::selectors;
use review_harvest::input::parse_seeds;
use review_harvest::output::{CrawlResult, JsonFileStore, ResultStore};
use review_harvest::{Orchestrator, Seed, SeedState};
use std::fs;
use std::path::Path;
use std::time::Duration;
use support::{
    listing_html, review_html, review_with_empty_content_html, review_without_rating_html,
    ScriptedBrowser, ScriptedSite,
};
use tempfile::TempDir;

const ALPHA: &str =
    "https://www.tripadvisor.com/Restaurant_Review-g652156-d100-Reviews-Alpha-Bulle_Fribourg.html";
const ALPHA_TEMPLATE: &str =
    "https://www.tripadvisor.com/Restaurant_Review-g652156-d100-Reviews-or10-Alpha-Bulle_Fribourg.html";
const ALPHA_OR15: &str =
    "https://www.tripadvisor.com/Restaurant_Review-g652156-d100-Reviews-or15-Alpha-Bulle_Fribourg.html";
const ALPHA_OR30: &str =
    "https://www.tripadvisor.com/Restaurant_Review-g652156-d100-Reviews-or30-Alpha-Bulle_Fribourg.html";
const BRAVO: &str =
    "https://www.tripadvisor.com/Restaurant_Review-g652156-d200-Reviews-Bravo-Bulle_Fribourg.html";

/// Crawler settings without retries, so failures surface immediately
fn no_retry_config() -> CrawlerConfig {
    CrawlerConfig {
        max_retries: 0,
        retry_backoff_ms: 1,
        max_backoff_ms: 1,
        ..CrawlerConfig::default()
    }
}

fn seeds(urls: &[&str]) -> Vec<Seed> {
    urls.iter()
        .enumerate()
        .map(|(position, url)| Seed {
            url: url.to_string(),
            position,
        })
        .collect()
}

fn read_result(path: &Path) -> CrawlResult {
    serde_json::from_str(&fs::read_to_string(path).expect("Result file missing"))
        .expect("Result file is not a crawl result")
}

/// Fifteen reviews titled `Review {page}-{i}`
fn full_page(page: usize) -> Vec<String> {
    (0..15)
        .map(|i| review_html(&format!("Review {}-{}", page, i), 40))
        .collect()
}

/// Alpha has 45 reviews over three pages, linked through an `-or10-` template
fn alpha_site() -> ScriptedSite {
    ScriptedSite::new()
        .page(
            ALPHA,
            listing_html(Some(45), Some(ALPHA_TEMPLATE), &full_page(0)),
        )
        .page(
            ALPHA_OR15,
            listing_html(Some(45), Some(ALPHA_TEMPLATE), &full_page(1)),
        )
        .page(
            ALPHA_OR30,
            listing_html(Some(45), Some(ALPHA_TEMPLATE), &full_page(2)),
        )
}

#[tokio::test]
async fn test_seed_without_reviews_writes_empty_result() {
    let temp = TempDir::new().unwrap();
    let site = ScriptedSite::new().page(BRAVO, listing_html(None, None, &[]));
    let browser = ScriptedBrowser::new(site);

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        browser.clone(),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds(&[BRAVO])).await;

    assert_eq!(report.persisted(), 1);
    assert!(report.failures.is_empty());

    let result = read_result(&temp.path().join("0_Bravo.json"));
    assert_eq!(result.expected_count, 0);
    assert_eq!(result.actual_count, 0);
    assert!(result.reviews.is_empty());
    assert_eq!(result.position, 0);

    let raw = fs::read_to_string(temp.path().join("0_Bravo.json")).unwrap();
    assert!(raw.contains("\"allReviews\": []"));

    let log = browser.log();
    // One visit to explore, one to scrape the only page
    assert_eq!(log.visited_urls(), vec![BRAVO.to_string(), BRAVO.to_string()]);
    assert_eq!(log.launched, 2);
    assert_eq!(log.closed, 2);
}

#[tokio::test]
async fn test_three_pages_collected_in_order() {
    let temp = TempDir::new().unwrap();
    let browser = ScriptedBrowser::new(alpha_site());

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        browser.clone(),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds(&[ALPHA])).await;

    assert_eq!(report.persisted(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.state, SeedState::Persisted);
    assert_eq!(outcome.expected_count, Some(45));
    assert_eq!(outcome.actual_count, Some(45));

    let result = read_result(&temp.path().join("0_Alpha.json"));
    assert_eq!(result.expected_count, 45);
    assert_eq!(result.actual_count, 45);
    assert_eq!(result.reviews.len(), 45);
    assert_eq!(result.reviews[0].title, "Review 0-0");
    assert_eq!(result.reviews[15].title, "Review 1-0");
    assert_eq!(result.reviews[44].title, "Review 2-14");
    assert_eq!(result.reviews[0].rating, 4.0);
    assert_eq!(result.reviews[0].date_of_visit, "December 2019");
    assert_eq!(result.reviews[0].rating_date, "January 5, 2020");
    assert!(result.diagnostics.is_empty());

    let log = browser.log();
    assert_eq!(
        log.visited_urls(),
        vec![
            ALPHA.to_string(),
            ALPHA.to_string(),
            ALPHA_OR15.to_string(),
            ALPHA_OR30.to_string(),
        ]
    );
    assert_eq!(log.visited[0].1, WaitUntil::Load);
    assert!(log.visited[1..]
        .iter()
        .all(|(_, wait)| *wait == WaitUntil::NetworkIdle));
    assert_eq!(log.launched, log.closed);
}

#[tokio::test]
async fn test_page_timeout_fails_seed_and_run_continues() {
    let temp = TempDir::new().unwrap();
    let site = alpha_site()
        .never_ready(ALPHA_OR15)
        .page(BRAVO, listing_html(Some(1), None, &[review_html("Only", 50)]));
    let browser = ScriptedBrowser::new(site);
    let store = JsonFileStore::new(temp.path());

    let orchestrator = Orchestrator::new(&no_retry_config(), browser.clone(), store.clone());
    let seeds = seeds(&[ALPHA, BRAVO]);
    let report = orchestrator.run(&seeds).await;

    // The failing seed leaves nothing behind
    assert!(!store.exists(&seeds[0]));
    assert!(!temp.path().join("0_Alpha.json").exists());

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.position, 0);
    assert_eq!(failure.url, ALPHA);
    assert_eq!(failure.kind, "content_timeout");
    assert!(failure.message.contains(ALPHA_OR15));
    assert_eq!(report.outcomes[0].state, SeedState::Failed);

    // The next seed is still processed
    assert_eq!(report.outcomes[1].state, SeedState::Persisted);
    let bravo = read_result(&temp.path().join("1_Bravo.json"));
    assert_eq!(bravo.actual_count, 1);
    assert_eq!(bravo.reviews[0].rating, 5.0);

    let log = browser.log();
    // Page three of Alpha is never attempted
    assert_eq!(log.visits_of(ALPHA_OR30), 0);
    assert_eq!(log.launched, 4);
    assert_eq!(log.closed, 4);
}

#[tokio::test]
async fn test_exploration_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let site = ScriptedSite::new()
        .page(ALPHA, listing_html(Some(3), None, &[]))
        .unreachable(ALPHA);
    let browser = ScriptedBrowser::new(site);

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        browser.clone(),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds(&[ALPHA])).await;

    assert_eq!(report.failures[0].kind, "navigation");
    assert_eq!(report.outcomes[0].state, SeedState::Failed);
    assert!(fs::read_dir(temp.path()).unwrap().next().is_none());

    let log = browser.log();
    assert_eq!(log.launched, 1);
    assert_eq!(log.closed, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let temp = TempDir::new().unwrap();
    let site = alpha_site().never_ready(ALPHA_OR30);
    let browser = ScriptedBrowser::new(site);

    let config = CrawlerConfig {
        max_retries: 2,
        retry_backoff_ms: 1,
        max_backoff_ms: 5,
        ..CrawlerConfig::default()
    };
    let orchestrator = Orchestrator::new(&config, browser.clone(), JsonFileStore::new(temp.path()));
    let report = orchestrator.run(&seeds(&[ALPHA])).await;

    assert_eq!(report.failed(), 1);
    // First attempt plus two retries
    assert_eq!(browser.log().visits_of(ALPHA_OR30), 3);
}

#[tokio::test]
async fn test_malformed_review_is_left_out_with_diagnostic() {
    let temp = TempDir::new().unwrap();
    let reviews = vec![
        review_html("Good", 45),
        review_without_rating_html("Unrated"),
        review_html("Fine", 30),
    ];
    let site = ScriptedSite::new().page(BRAVO, listing_html(Some(3), None, &reviews));

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        ScriptedBrowser::new(site),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds(&[BRAVO])).await;

    assert_eq!(report.persisted(), 1);
    assert_eq!(report.outcomes[0].diagnostics, 1);

    let result = read_result(&temp.path().join("0_Bravo.json"));
    assert_eq!(result.expected_count, 3);
    assert_eq!(result.actual_count, 2);
    let titles: Vec<&str> = result.reviews.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Good", "Fine"]);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("0_Bravo.json")).unwrap())
            .unwrap();
    let diagnostic = &raw["diagnostics"][0];
    assert_eq!(diagnostic["kind"], "malformed_review");
    assert_eq!(diagnostic["field"], "rating");
    assert_eq!(diagnostic["index"], 1);
    assert_eq!(diagnostic["url"], BRAVO);
}

#[tokio::test]
async fn test_review_with_empty_text_is_kept() {
    let temp = TempDir::new().unwrap();
    let reviews = vec![review_html("Good", 45), review_with_empty_content_html("Terse")];
    let site = ScriptedSite::new().page(BRAVO, listing_html(Some(2), None, &reviews));

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        ScriptedBrowser::new(site),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds(&[BRAVO])).await;
    assert_eq!(report.outcomes[0].diagnostics, 0);

    let result = read_result(&temp.path().join("0_Bravo.json"));
    assert_eq!(result.actual_count, 2);
    assert_eq!(result.reviews[1].title, "Terse");
    assert_eq!(result.reviews[1].content, "");
    assert!(!result.has_count_mismatch());
}

#[tokio::test]
async fn test_invalid_seed_url_fails_only_that_seed() {
    let temp = TempDir::new().unwrap();
    let json = format!(
        r#"[{{"webUrl": "{}"}}, {{"webUrl": "not a url"}}, {{"webUrl": " {} "}}]"#,
        ALPHA, BRAVO
    );
    let seeds = parse_seeds(&json).unwrap();
    assert_eq!(seeds.len(), 3);

    let site = alpha_site().page(BRAVO, listing_html(Some(1), None, &[review_html("Only", 50)]));
    let browser = ScriptedBrowser::new(site);
    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        browser.clone(),
        JsonFileStore::new(temp.path()),
    );
    let report = orchestrator.run(&seeds).await;

    assert_eq!(report.persisted(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.outcomes[1].state, SeedState::Failed);

    let failure = &report.failures[0];
    assert_eq!(failure.position, 1);
    assert_eq!(failure.url, "not a url");
    assert_eq!(failure.kind, "invalid_url");

    // Positions of the good seeds are unchanged
    assert_eq!(read_result(&temp.path().join("0_Alpha.json")).actual_count, 45);
    assert_eq!(read_result(&temp.path().join("2_Bravo.json")).position, 2);

    // No browser session is spent on the bad seed
    let log = browser.log();
    assert_eq!(log.launched, 4);
    assert_eq!(log.launched, log.closed);
}

#[tokio::test]
async fn test_template_without_marker_visits_distinct_pages() {
    let temp = TempDir::new().unwrap();
    let second = "https://www.tripadvisor.com/Restaurant_Review-g652156-d200-Reviews-Bravo-page2.html";
    let site = ScriptedSite::new()
        .page(BRAVO, listing_html(Some(45), Some(second), &full_page(0)))
        .page(second, listing_html(Some(45), Some(second), &full_page(1)));
    let browser = ScriptedBrowser::new(site);

    let orchestrator = Orchestrator::new(
        &no_retry_config(),
        browser.clone(),
        JsonFileStore::new(temp.path()),
    );
    orchestrator.run(&seeds(&[BRAVO])).await;

    assert_eq!(browser.log().visits_of(second), 1);

    let result = read_result(&temp.path().join("0_Bravo.json"));
    assert_eq!(result.actual_count, 30);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, review_harvest::output::Diagnostic::SequenceIntegrity { .. })));
}

#[tokio::test]
async fn test_resume_skips_existing_results() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path());
    let seeds = seeds(&[ALPHA, BRAVO]);

    store
        .write(&seeds[0], &CrawlResult::new(45, vec![], 0, vec![]))
        .unwrap();

    let site = ScriptedSite::new().page(BRAVO, listing_html(None, None, &[]));
    let browser = ScriptedBrowser::new(site);
    let orchestrator =
        Orchestrator::new(&no_retry_config(), browser.clone(), store.clone()).with_resume(true);
    let report = orchestrator.run(&seeds).await;

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.outcomes[0].state, SeedState::Skipped);
    assert_eq!(report.persisted(), 1);
    assert_eq!(browser.log().visits_of(ALPHA), 0);

    // The existing file is untouched
    assert_eq!(read_result(&store.output_path(&seeds[0])).expected_count, 45);
}

mod webdriver_backend {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SELECTOR_PRESENT: &str = "return document.querySelector(arguments[0]) !== null;";

    async fn mount_script(server: &MockServer, script: &str, value: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/session/s1/execute/sync"))
            .and(body_partial_json(json!({ "script": script })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": value })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_harvest_through_webdriver() {
        let server = MockServer::start().await;
        let html = listing_html(
            Some(2),
            None,
            &[review_html("First", 50), review_html("Second", 35)],
        );

        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "s1", "capabilities": {} }
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/session/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/session/s1/url"))
            .and(body_partial_json(json!({ "url": BRAVO })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/session/s1/url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": BRAVO })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/session/s1/execute/sync"))
            .and(body_string_contains("performance.getEntriesByType"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 8 })))
            .mount(&server)
            .await;

        mount_script(&server, SELECTOR_PRESENT, json!(true)).await;
        mount_script(
            &server,
            &selectors::presence_script(selectors::LANGUAGE_FILTER_ALL),
            json!(false),
        )
        .await;
        mount_script(
            &server,
            &selectors::presence_script(selectors::EXPAND_REVIEWS),
            json!(false),
        )
        .await;
        mount_script(&server, selectors::SNAPSHOT_SCRIPT, json!(html)).await;

        let browser_config = BrowserConfig {
            webdriver_url: server.uri(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            args: vec!["--no-sandbox".to_string()],
            binary_path: None,
        };
        let readiness = ReadinessPolicy::new(Duration::from_millis(200), Duration::from_millis(10));
        let browser = WebDriverBrowser::new(&browser_config, readiness)
            .unwrap()
            .with_network_quiet(Duration::from_millis(20));

        let temp = TempDir::new().unwrap();
        let orchestrator =
            Orchestrator::new(&no_retry_config(), browser, JsonFileStore::new(temp.path()));
        let report = orchestrator.run(&seeds(&[BRAVO])).await;

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        let result = read_result(&temp.path().join("0_Bravo.json"));
        assert_eq!(result.actual_count, 2);
        assert_eq!(result.reviews[0].rating, 5.0);
        assert_eq!(result.reviews[1].rating, 3.5);
        assert_eq!(result.reviews[1].title, "Second");
    }
}
