//! Bounded polling for readiness conditions
//!
//! Every wait in the crawler goes through `poll_until`: a condition is checked,
//! and re-checked after `poll_interval`, until it holds or `timeout` elapses.

use crate::browser::{BrowserError, BrowserResult};
use crate::config::CrawlerConfig;
use std::future::Future;
use std::time::{Duration, Instant};

/// How long to wait for a condition and how often to check it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ReadinessPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Builds the policy from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.readiness_timeout_ms),
            Duration::from_millis(config.poll_interval_ms),
        )
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Polls `check` until it reports true or the policy's timeout is spent
///
/// Errors returned by `check` abort the wait immediately. The condition is
/// always checked at least once, even with a zero timeout.
///
/// # Arguments
///
/// * `policy` - Timeout and polling interval
/// * `condition` - Human-readable name used in the timeout error
/// * `check` - Produces a future resolving to whether the condition holds
pub async fn poll_until<F, Fut>(
    policy: &ReadinessPolicy,
    condition: &str,
    mut check: F,
) -> BrowserResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BrowserResult<bool>>,
{
    let started = Instant::now();

    loop {
        if check().await? {
            return Ok(());
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(BrowserError::Timeout {
                condition: condition.to_string(),
                waited_ms: elapsed.as_millis() as u64,
            });
        }

        let remaining = policy.timeout - elapsed;
        tokio::time::sleep(policy.poll_interval.min(remaining)).await;
    }
}
