use crate::config::types::{BrowserConfig, Config, CrawlerConfig, InputConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_browser_config(&config.browser)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates input configuration
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.seeds_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seeds_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if let Some(report_path) = &config.report_path {
        if report_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "webdriver_url '{}' must use http or https",
            config.webdriver_url
        )));
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if let Some(arg) = config.args.iter().find(|arg| !arg.starts_with('-')) {
        return Err(ConfigError::Validation(format!(
            "browser args must be command-line switches, got '{}'",
            arg
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.readiness_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "readiness_timeout_ms must be >= 100ms, got {}ms",
            config.readiness_timeout_ms
        )));
    }

    if config.poll_interval_ms < 10 || config.poll_interval_ms > config.readiness_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 10ms and readiness_timeout_ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_backoff_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_ms ({}ms) cannot exceed max_backoff_ms ({}ms)",
            config.retry_backoff_ms, config.max_backoff_ms
        )));
    }

    Ok(())
}
