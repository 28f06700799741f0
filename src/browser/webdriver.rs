//! W3C WebDriver backend
//!
//! This module implements the browser contract on top of a running WebDriver
//! server (chromedriver, geckodriver, a Selenium grid, ...) using plain HTTP:
//! - `POST /session` to launch, `DELETE /session/{id}` to close
//! - `POST /session/{id}/url` to navigate, `GET /session/{id}/url` for the location
//! - `POST /session/{id}/element` + `/element/{eid}/click` to click
//! - `POST /session/{id}/execute/sync` to evaluate scripts and poll predicates

use crate::browser::readiness::{poll_until, ReadinessPolicy};
use crate::browser::traits::{Browser, BrowserSession, Page, WaitUntil};
use crate::browser::{BrowserError, BrowserResult};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Key under which WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Number of finished resource loads, or -1 while the document is still loading
const RESOURCE_COUNT_SCRIPT: &str = r#"return document.readyState === "complete" ? performance.getEntriesByType("resource").length : -1;"#;

/// How long the resource count must stay unchanged before the network counts as idle
const DEFAULT_NETWORK_QUIET: Duration = Duration::from_millis(500);

const SELECTOR_PRESENT_SCRIPT: &str = "return document.querySelector(arguments[0]) !== null;";

/// Builds Chrome capabilities for a new session
///
/// # Example
///
/// ```
/// use review_harvest::browser::chrome_capabilities;
/// use review_harvest::config::BrowserConfig;
///
/// let config = BrowserConfig {
///     webdriver_url: "http://localhost:9515".to_string(),
///     headless: true,
///     window_width: 1920,
///     window_height: 1080,
///     args: vec!["--no-sandbox".to_string()],
///     binary_path: None,
/// };
///
/// let caps = chrome_capabilities(&config);
/// assert_eq!(caps["capabilities"]["alwaysMatch"]["browserName"], "chrome");
/// ```
pub fn chrome_capabilities(config: &BrowserConfig) -> Value {
    let mut args = config.args.clone();
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.push(format!(
        "--window-size={},{}",
        config.window_width, config.window_height
    ));

    let mut chrome_options = json!({ "args": args });
    if let Some(binary) = &config.binary_path {
        chrome_options["binary"] = json!(binary);
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "acceptInsecureCerts": true,
                "goog:chromeOptions": chrome_options
            }
        }
    })
}

/// Tracks how long the resource count of a page has stayed the same
#[derive(Debug)]
struct QuietWindow {
    quiet: Duration,
    last: Option<(i64, Instant)>,
}

impl QuietWindow {
    fn new(quiet: Duration) -> Self {
        Self { quiet, last: None }
    }

    /// Records one observation; true once `count` has held for the whole window
    fn observe(&mut self, count: i64, now: Instant) -> bool {
        if count < 0 {
            self.last = None;
            return false;
        }

        match self.last {
            Some((seen, since)) if seen == count => now.duration_since(since) >= self.quiet,
            _ => {
                self.last = Some((count, now));
                self.quiet.is_zero()
            }
        }
    }
}

/// HTTP connection to a WebDriver server
#[derive(Debug)]
struct Connection {
    client: Client,
    endpoint: String,
}

impl Connection {
    /// Sends one WebDriver command and returns the response's `value` member
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> BrowserResult<Value> {
        let url = format!("{}{}", self.endpoint, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if let Some(error) = payload.pointer("/value/error").and_then(Value::as_str) {
            let message = payload
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown webdriver error");
            return Err(classify_error(error, message));
        }

        if !status.is_success() {
            return Err(BrowserError::Protocol(format!(
                "{} returned HTTP {}: {}",
                path,
                status.as_u16(),
                truncate_for_log(&text, 240)
            )));
        }

        Ok(payload.get("value").cloned().unwrap_or(Value::Null))
    }
}

/// Maps a WebDriver error code to a browser error
fn classify_error(error: &str, message: &str) -> BrowserError {
    match error {
        "no such element" => BrowserError::ElementNotFound {
            selector: message.to_string(),
        },
        "timeout" | "script timeout" => BrowserError::Timeout {
            condition: message.to_string(),
            waited_ms: 0,
        },
        "javascript error" => BrowserError::Script(message.to_string()),
        "invalid session id" => BrowserError::SessionClosed,
        _ => BrowserError::Protocol(format!("{}: {}", error, message)),
    }
}

fn truncate_for_log(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        let cut: String = input.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Launches sessions on a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    connection: Arc<Connection>,
    capabilities: Value,
    readiness: ReadinessPolicy,
    network_quiet: Duration,
}

impl WebDriverBrowser {
    /// Creates a browser handle for the configured WebDriver endpoint
    ///
    /// No connection is made until `launch` is called.
    pub fn new(config: &BrowserConfig, readiness: ReadinessPolicy) -> BrowserResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            connection: Arc::new(Connection {
                client,
                endpoint: config.webdriver_url.trim_end_matches('/').to_string(),
            }),
            capabilities: chrome_capabilities(config),
            readiness,
            network_quiet: DEFAULT_NETWORK_QUIET,
        })
    }

    /// Sets how long the network must stay quiet for `WaitUntil::NetworkIdle`
    pub fn with_network_quiet(mut self, quiet: Duration) -> Self {
        self.network_quiet = quiet;
        self
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        let value = self
            .connection
            .command(Method::POST, "/session", Some(self.capabilities.clone()))
            .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BrowserError::Protocol(format!(
                    "session id missing in response: {}",
                    truncate_for_log(&value.to_string(), 220)
                ))
            })?
            .to_string();

        tracing::debug!("Launched WebDriver session {}", session_id);

        Ok(Box::new(WebDriverSession {
            connection: Arc::clone(&self.connection),
            session_id: Some(session_id),
            readiness: self.readiness,
            network_quiet: self.network_quiet,
        }))
    }
}

/// A live WebDriver session
#[derive(Debug)]
pub struct WebDriverSession {
    connection: Arc<Connection>,
    session_id: Option<String>,
    readiness: ReadinessPolicy,
    network_quiet: Duration,
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn new_page(&mut self) -> BrowserResult<Box<dyn Page>> {
        // A WebDriver session drives a single top-level window
        let session_id = self.session_id.clone().ok_or(BrowserError::SessionClosed)?;
        Ok(Box::new(WebDriverPage {
            connection: Arc::clone(&self.connection),
            session_id,
            readiness: self.readiness,
            network_quiet: self.network_quiet,
        }))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if let Some(session_id) = self.session_id.take() {
            self.connection
                .command(Method::DELETE, &format!("/session/{}", session_id), None)
                .await?;
            tracing::debug!("Closed WebDriver session {}", session_id);
        }
        Ok(())
    }
}

/// The window of a WebDriver session
#[derive(Debug)]
pub struct WebDriverPage {
    connection: Arc<Connection>,
    session_id: String,
    readiness: ReadinessPolicy,
    network_quiet: Duration,
}

impl WebDriverPage {
    fn path(&self, command: &str) -> String {
        format!("/session/{}{}", self.session_id, command)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        self.connection
            .command(
                Method::POST,
                &self.path("/execute/sync"),
                Some(json!({ "script": script, "args": args })),
            )
            .await
    }

    async fn predicate_holds(&self, predicate: &str) -> BrowserResult<bool> {
        let script = format!("return !!({});", predicate);
        let value = self.execute(&script, Vec::new()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn resource_count(&self) -> BrowserResult<i64> {
        let value = self.execute(RESOURCE_COUNT_SCRIPT, Vec::new()).await?;
        Ok(value.as_i64().unwrap_or(-1))
    }

    /// Waits until the page has loaded and no new resource finished for the quiet window
    async fn wait_for_network_idle(&self) -> BrowserResult<()> {
        let window = Mutex::new(QuietWindow::new(self.network_quiet));
        let window = &window;

        poll_until(&self.readiness, "network idle", move || async move {
            let count = self.resource_count().await?;
            let mut window = window
                .lock()
                .map_err(|_| BrowserError::Protocol("network idle tracker poisoned".to_string()))?;
            Ok(window.observe(count, Instant::now()))
        })
        .await
    }

    async fn selector_present(&self, selector: &str) -> BrowserResult<bool> {
        let value = self
            .execute(SELECTOR_PRESENT_SCRIPT, vec![json!(selector)])
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> BrowserResult<()> {
        self.connection
            .command(Method::POST, &self.path("/url"), Some(json!({ "url": url })))
            .await
            .map_err(|e| match e {
                BrowserError::Timeout { .. } | BrowserError::SessionClosed => e,
                other => BrowserError::Navigation {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })?;

        if wait_until == WaitUntil::NetworkIdle {
            self.wait_for_network_idle().await?;
        }

        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> BrowserResult<()> {
        let condition = format!("selector {}", selector);
        poll_until(&self.readiness, &condition, || self.selector_present(selector)).await
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let element = self
            .connection
            .command(
                Method::POST,
                &self.path("/element"),
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await
            .map_err(|e| match e {
                BrowserError::ElementNotFound { .. } => BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                },
                other => other,
            })?;

        let element_id = element
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::ElementNotFound {
                selector: selector.to_string(),
            })?;

        self.connection
            .command(
                Method::POST,
                &self.path(&format!("/element/{}/click", element_id)),
                Some(json!({})),
            )
            .await?;

        Ok(())
    }

    async fn wait_for_function(&self, predicate: &str) -> BrowserResult<()> {
        poll_until(&self.readiness, predicate, || self.predicate_holds(predicate)).await
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<Value> {
        self.execute(script, Vec::new()).await
    }

    async fn url(&self) -> BrowserResult<String> {
        let value = self
            .connection
            .command(Method::GET, &self.path("/url"), None)
            .await?;

        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Protocol(format!("unexpected url payload: {}", value)))
    }
}
