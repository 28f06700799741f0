//! Seed list loading
//!
//! The seed list is a pre-generated JSON array of listing records. Only the
//! `webUrl` field is read; every other field is ignored. The order of the array
//! defines each seed's position, which is also the primary key of its output file.

use crate::ConfigResult;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// One input listing URL plus its index in the seed list
///
/// The URL is kept as written (trimmed). It is checked per seed with
/// [`Seed::validate`], so one bad record fails only its own seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub url: String,
    pub position: usize,
}

/// Why a seed's `webUrl` cannot be visited
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedUrlError {
    #[error("seed {position} has no webUrl")]
    Missing { position: usize },

    #[error("seed {position} has invalid webUrl '{url}': {reason}")]
    Unparseable {
        position: usize,
        url: String,
        reason: String,
    },

    #[error("seed {position} webUrl '{url}' must use http or https")]
    UnsupportedScheme { position: usize, url: String },
}

impl Seed {
    /// Checks that the URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<Url, SeedUrlError> {
        if self.url.is_empty() {
            return Err(SeedUrlError::Missing {
                position: self.position,
            });
        }

        let parsed = Url::parse(&self.url).map_err(|e| SeedUrlError::Unparseable {
            position: self.position,
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            _ => Err(SeedUrlError::UnsupportedScheme {
                position: self.position,
                url: self.url.clone(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeedRecord {
    #[serde(rename = "webUrl", default)]
    web_url: Option<String>,
}

/// Loads the seed list from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the JSON seed list
///
/// # Returns
///
/// * `Ok(Vec<Seed>)` - Seeds in input order, positions starting at 0
/// * `Err(ConfigError)` - The file could not be read or is not a JSON array of records
pub fn load_seeds(path: &Path) -> ConfigResult<Vec<Seed>> {
    let content = std::fs::read_to_string(path)?;
    parse_seeds(&content)
}

/// Parses a JSON seed list held in memory
///
/// Records with a missing or invalid `webUrl` keep their position; they fail
/// when the seed is processed.
pub fn parse_seeds(json: &str) -> ConfigResult<Vec<Seed>> {
    let records: Vec<SeedRecord> = serde_json::from_str(json)?;

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(position, record)| Seed {
            url: record
                .web_url
                .map(|url| url.trim().to_string())
                .unwrap_or_default(),
            position,
        })
        .collect())
}
