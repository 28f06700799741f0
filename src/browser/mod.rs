//! Browser module: the contract the crawler drives pages through
//!
//! The crawler never talks to a browser directly. It consumes the narrow
//! `Browser` / `BrowserSession` / `Page` contract defined in `traits`, which
//! the WebDriver backend implements over the W3C WebDriver HTTP protocol.
//!
//! # Components
//!
//! - `traits`: the async contract (navigate, wait, click, evaluate)
//! - `readiness`: bounded polling used for every wait
//! - `webdriver`: a `reqwest`-based WebDriver client implementing the contract

mod readiness;
mod traits;
mod webdriver;

pub use readiness::{poll_until, ReadinessPolicy};
pub use traits::{Browser, BrowserSession, Page, WaitUntil};
pub use webdriver::{chrome_capabilities, WebDriverBrowser, WebDriverPage, WebDriverSession};

use thiserror::Error;

/// Errors raised by a browser backend
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {waited_ms}ms waiting for {condition}")]
    Timeout { condition: String, waited_ms: u64 },

    #[error("No element matches selector {selector}")]
    ElementNotFound { selector: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Browser session is closed")]
    SessionClosed,

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    #[error("HTTP error talking to the browser: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;
