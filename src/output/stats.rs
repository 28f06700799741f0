//! Statistics over an existing data directory
//!
//! Used by `--stats` to summarize what previous runs wrote without
//! starting a browser.

use crate::output::result::CrawlResult;
use crate::HarvestError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Totals across all result files of a data directory
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Number of result files read
    pub seeds: usize,

    /// Sum of the totals the listings reported
    pub expected_reviews: u64,

    /// Sum of the reviews actually collected
    pub collected_reviews: u64,

    /// Files whose collected count differs from the reported count
    pub mismatched: Vec<(usize, u32, usize)>,

    /// Files carrying at least one diagnostic
    pub seeds_with_diagnostics: usize,

    /// Review count per rating, keyed by the rating formatted as `4.5`
    pub rating_distribution: BTreeMap<String, u64>,

    /// JSON files that are not readable results
    pub unreadable: Vec<PathBuf>,
}

impl HarvestStatistics {
    /// Share of reported reviews that were collected, as a percentage
    pub fn coverage(&self) -> f64 {
        if self.expected_reviews == 0 {
            return 0.0;
        }
        (self.collected_reviews as f64 / self.expected_reviews as f64) * 100.0
    }
}

/// Returns true for names the result store writes: `{position}_{anything}.json`
fn is_result_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(stem) = name.strip_suffix(".json") else {
        return false;
    };

    match stem.split_once('_') {
        Some((position, _)) => !position.is_empty() && position.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Reads every `{position}_*.json` result in `data_dir`
///
/// Other files, such as a run report kept in the same directory, are ignored.
///
/// # Arguments
///
/// * `data_dir` - Directory the result store wrote into
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Totals over every readable result file
/// * `Err(HarvestError)` - The directory could not be listed
pub fn load_statistics(data_dir: &Path) -> Result<HarvestStatistics, HarvestError> {
    let mut stats = HarvestStatistics::default();

    let mut paths: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_result_file(path))
        .collect();
    paths.sort();

    for path in paths {
        let result = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<CrawlResult>(&content).ok());

        let Some(result) = result else {
            tracing::debug!("Skipping unreadable result file {}", path.display());
            stats.unreadable.push(path);
            continue;
        };

        stats.seeds += 1;
        stats.expected_reviews += u64::from(result.expected_count);
        stats.collected_reviews += result.reviews.len() as u64;

        if result.has_count_mismatch() {
            stats
                .mismatched
                .push((result.position, result.expected_count, result.actual_count));
        }
        if !result.diagnostics.is_empty() {
            stats.seeds_with_diagnostics += 1;
        }
        for review in &result.reviews {
            *stats
                .rating_distribution
                .entry(format!("{:.1}", review.rating))
                .or_insert(0) += 1;
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Result files: {}", stats.seeds);
    println!("  Reviews reported: {}", stats.expected_reviews);
    println!("  Reviews collected: {}", stats.collected_reviews);
    println!("  Coverage: {:.1}%", stats.coverage());
    println!("  Seeds with diagnostics: {}", stats.seeds_with_diagnostics);
    println!();

    if !stats.rating_distribution.is_empty() {
        println!("Reviews by Rating:");
        for (rating, count) in stats.rating_distribution.iter().rev() {
            let percentage = if stats.collected_reviews > 0 {
                (*count as f64 / stats.collected_reviews as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", rating, count, percentage);
        }
        println!();
    }

    if !stats.mismatched.is_empty() {
        println!("Count Mismatches ({}):", stats.mismatched.len());
        for (position, expected, actual) in &stats.mismatched {
            println!(
                "  - seed {}: reported {}, collected {}",
                position, expected, actual
            );
        }
        println!();
    }

    if !stats.unreadable.is_empty() {
        println!("Unreadable Files ({}):", stats.unreadable.len());
        for path in &stats.unreadable {
            println!("  - {}", path.display());
        }
        println!();
    }
}
