use crate::input::Seed;
use crate::output::result::CrawlResult;
use crate::output::traits::{ResultStore, StoreError, StoreResult};
use std::fs;
use std::path::PathBuf;

/// Writes one pretty-printed JSON file per seed into a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `data_dir`; the directory is created on first write
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl ResultStore for JsonFileStore {
    fn output_path(&self, seed: &Seed) -> PathBuf {
        self.data_dir.join(file_name_for(seed))
    }

    fn write(&self, seed: &Seed, result: &CrawlResult) -> StoreResult<PathBuf> {
        if derive_slug(&seed.url).is_none() {
            tracing::warn!(
                "Seed {} has no usable name segment in {}, writing {}",
                seed.position,
                seed.url,
                file_name_for(seed)
            );
        }

        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let path = self.output_path(seed);
        let json = serde_json::to_string_pretty(result)?;

        // The final name only ever holds a complete file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Wrote {} reviews to {}", result.actual_count, path.display());
        Ok(path)
    }
}

/// The name segment of a seed URL: the fifth `-`-separated piece
///
/// Characters outside `[A-Za-z0-9_.]` are dropped. Returns `None` when nothing
/// usable is left.
///
/// # Examples
///
/// ```
/// use review_harvest::output::derive_slug;
///
/// let url = "https://www.tripadvisor.com/Restaurant_Review-g652156-d17621567-Reviews-Kalasin-Bulle.html";
/// assert_eq!(derive_slug(url).as_deref(), Some("Kalasin"));
/// assert_eq!(derive_slug("https://example.com/short"), None);
/// ```
pub fn derive_slug(url: &str) -> Option<String> {
    let segment = url.split('-').nth(4)?;
    let slug: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.'))
        .collect();

    // Empty, or only dots
    if slug.chars().all(|c| c == '.') {
        None
    } else {
        Some(slug)
    }
}

/// `{position}_{slug}.json`, or `{position}_seed.json` without a usable slug
pub fn file_name_for(seed: &Seed) -> String {
    match derive_slug(&seed.url) {
        Some(slug) => format!("{}_{}.json", seed.position, slug),
        None => format!("{}_seed.json", seed.position),
    }
}
