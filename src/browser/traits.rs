//! Browser contract traits
//!
//! Scripts follow the WebDriver convention: `evaluate` takes a function body
//! that uses `return`, while `wait_for_function` takes a bare JavaScript
//! expression that is polled until it is truthy.

use crate::browser::BrowserResult;
use async_trait::async_trait;
use serde_json::Value;

/// How long `Page::goto` waits before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    /// Return once the document has loaded
    #[default]
    Load,

    /// Additionally wait until the page stops fetching resources
    NetworkIdle,
}

/// A browser that can open isolated sessions
#[async_trait]
pub trait Browser: Send + Sync {
    /// Starts a new browser session
    async fn launch(&self) -> BrowserResult<Box<dyn BrowserSession>>;
}

/// One running browser process or remote session
///
/// The owner must call `close` on every exit path; closing twice is a no-op.
#[async_trait]
pub trait BrowserSession: Send {
    /// Opens a page (tab) in this session
    async fn new_page(&mut self) -> BrowserResult<Box<dyn Page>>;

    /// Ends the session and releases the browser
    async fn close(&mut self) -> BrowserResult<()>;
}

/// A single page inside a session
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigates to `url` and waits according to `wait_until`
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> BrowserResult<()>;

    /// Waits until an element matching `selector` is present
    async fn wait_for_selector(&self, selector: &str) -> BrowserResult<()>;

    /// Clicks the first element matching `selector`
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Waits until the JavaScript expression `predicate` evaluates truthy
    async fn wait_for_function(&self, predicate: &str) -> BrowserResult<()>;

    /// Runs `script` against the live document and returns its JSON result
    async fn evaluate(&self, script: &str) -> BrowserResult<Value>;

    /// Returns the page's current location
    async fn url(&self) -> BrowserResult<String>;
}
