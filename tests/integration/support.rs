//! In-memory browser double for orchestration tests
//!
//! A `ScriptedSite` maps URLs to HTML documents. Pages can be made to fail
//! navigation or to never become ready, and every session and visit is logged.

use async_trait::async_trait;
use review_harvest::browser::{
    Browser, BrowserError, BrowserResult, BrowserSession, Page, WaitUntil,
};
use review_harvest::extract::selectors;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct ScriptedSite {
    pages: HashMap<String, String>,
    never_ready: HashSet<String>,
    unreachable: HashSet<String>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    /// `body` never appears on this page
    pub fn never_ready(mut self, url: &str) -> Self {
        self.never_ready.insert(url.to_string());
        self
    }

    /// Navigation to this page fails
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launched: usize,
    pub closed: usize,
    pub visited: Vec<(String, WaitUntil)>,
}

impl BrowserLog {
    pub fn visited_urls(&self) -> Vec<String> {
        self.visited.iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn visits_of(&self, url: &str) -> usize {
        self.visited.iter().filter(|(u, _)| u == url).count()
    }
}

#[derive(Clone)]
pub struct ScriptedBrowser {
    site: Arc<ScriptedSite>,
    log: Arc<Mutex<BrowserLog>>,
}

impl ScriptedBrowser {
    pub fn new(site: ScriptedSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(BrowserLog::default())),
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, BrowserLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        self.log.lock().unwrap().launched += 1;
        Ok(Box::new(ScriptedSession {
            site: Arc::clone(&self.site),
            log: Arc::clone(&self.log),
            open: true,
        }))
    }
}

struct ScriptedSession {
    site: Arc<ScriptedSite>,
    log: Arc<Mutex<BrowserLog>>,
    open: bool,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn new_page(&mut self) -> BrowserResult<Box<dyn Page>> {
        if !self.open {
            return Err(BrowserError::SessionClosed);
        }
        Ok(Box::new(ScriptedPage {
            site: Arc::clone(&self.site),
            log: Arc::clone(&self.log),
            location: Mutex::new(String::from("about:blank")),
        }))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.open {
            self.open = false;
            self.log.lock().unwrap().closed += 1;
        }
        Ok(())
    }
}

struct ScriptedPage {
    site: Arc<ScriptedSite>,
    log: Arc<Mutex<BrowserLog>>,
    location: Mutex<String>,
}

impl ScriptedPage {
    fn current(&self) -> String {
        self.location.lock().unwrap().clone()
    }

    fn html(&self) -> String {
        self.site
            .pages
            .get(&self.current())
            .cloned()
            .unwrap_or_default()
    }

    fn has_element(&self, selector: &str) -> bool {
        let document = scraper::Html::parse_document(&self.html());
        let selector = scraper::Selector::parse(selector).unwrap();
        let found = document.select(&selector).next().is_some();
        found
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> BrowserResult<()> {
        self.log
            .lock()
            .unwrap()
            .visited
            .push((url.to_string(), wait_until));

        if self.site.unreachable.contains(url) || !self.site.pages.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }

        *self.location.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> BrowserResult<()> {
        if self.site.never_ready.contains(&self.current()) {
            return Err(BrowserError::Timeout {
                condition: format!("selector {}", selector),
                waited_ms: 30_000,
            });
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        if self.has_element(selector) {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn wait_for_function(&self, _predicate: &str) -> BrowserResult<()> {
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<Value> {
        if script == selectors::SNAPSHOT_SCRIPT {
            return Ok(Value::String(self.html()));
        }

        for selector in [selectors::LANGUAGE_FILTER_ALL, selectors::EXPAND_REVIEWS] {
            if script == selectors::presence_script(selector) {
                return Ok(Value::Bool(self.has_element(selector)));
            }
        }

        Err(BrowserError::Script(format!("unexpected script: {}", script)))
    }

    async fn url(&self) -> BrowserResult<String> {
        Ok(self.current())
    }
}

/// HTML for one well-formed review container
pub fn review_html(title: &str, bubble: u32) -> String {
    format!(
        r#"<div class="review-container">
            <span class="ui_bubble_rating bubble_{bubble}"></span>
            <span class="ratingDate" title="January 5, 2020">Reviewed January 5, 2020</span>
            <a class="title"><span class="noQuotes">{title}</span></a>
            <div class="prw_rup prw_reviews_stay_date_hsx"><span class="stay_date_label">Date of visit:</span> December 2019</div>
            <p class="partial_entry">Review text for {title}.</p>
        </div>"#
    )
}

/// HTML for a review container without its rating bubble
pub fn review_without_rating_html(title: &str) -> String {
    format!(
        r#"<div class="review-container">
            <span class="ratingDate" title="January 5, 2020"></span>
            <span class="noQuotes">{title}</span>
            <div class="prw_rup prw_reviews_stay_date_hsx">Date of visit: December 2019</div>
            <p class="partial_entry">Unrated.</p>
        </div>"#
    )
}

/// HTML for a review whose text element is present but empty
pub fn review_with_empty_content_html(title: &str) -> String {
    format!(
        r#"<div class="review-container">
            <span class="ui_bubble_rating bubble_30"></span>
            <span class="ratingDate" title="March 1, 2021"></span>
            <span class="noQuotes">{title}</span>
            <div class="prw_rup prw_reviews_stay_date_hsx">Date of visit: February 2021</div>
            <p class="partial_entry"> </p>
        </div>"#
    )
}

/// A listing page: optional count header, optional pagination and review containers
pub fn listing_html(total: Option<u32>, second_page: Option<&str>, reviews: &[String]) -> String {
    let header = total
        .map(|t| format!(r#"<span class="reviews_header_count">({})</span>"#, t))
        .unwrap_or_default();
    let pagination = second_page
        .map(|href| {
            format!(
                r#"<div class="pageNumbers"><a class="pageNum current">1</a><a class="pageNum" href="{}">2</a></div>"#,
                href
            )
        })
        .unwrap_or_default();
    let interactions = if reviews.is_empty() {
        String::new()
    } else {
        r#"<input type="radio" id="filters_detail_language_filterLang_ALL"><span class="taLnk ulBlueLinks">More</span>"#
            .to_string()
    };

    format!(
        "<html><body>{}{}{}{}</body></html>",
        header,
        interactions,
        reviews.join("\n"),
        pagination
    )
}
