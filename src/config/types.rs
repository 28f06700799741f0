use serde::Deserialize;

/// Main configuration structure for Review-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub browser: BrowserConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Where the seed list comes from
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the JSON seed list (an array of objects with a `webUrl` field)
    #[serde(rename = "seeds-path")]
    pub seeds_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `{position}_{slug}.json` file per seed
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Optional path for the JSON run report
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,
}

/// Headless browser (WebDriver) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Base URL of a running WebDriver server (e.g. chromedriver)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    /// Extra command-line switches passed to the browser
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Explicit browser binary, when the driver cannot find one on its own
    #[serde(rename = "binary-path", default)]
    pub binary_path: Option<String>,
}

/// Crawl pacing, readiness and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// How long a readiness condition may take before the page is abandoned (milliseconds)
    #[serde(rename = "readiness-timeout-ms", default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,

    /// Delay between two checks of a readiness condition (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Extra attempts for a page that failed to load or settle
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every further attempt (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for a single retry delay (milliseconds)
    #[serde(rename = "max-backoff-ms", default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            readiness_timeout_ms: default_readiness_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_browser_args() -> Vec<String> {
    [
        "--disable-gpu",
        "--disable-dev-shm-usage",
        "--disable-setuid-sandbox",
        "--no-sandbox",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

fn default_readiness_timeout_ms() -> u64 {
    30_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}
