use crate::pagination::marker::{apply_offset, offset_of};
use crate::pagination::PAGE_SIZE;
use std::collections::HashSet;
use thiserror::Error;

/// One page of a listing: the URL to visit and the offset it should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    pub offset: u32,
    pub url: String,
}

/// Something about a derived sequence that points at a malformed offset template
///
/// Warnings are not fatal; the orchestrator logs them, records them in the seed's
/// diagnostics and only visits distinct URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceIntegrityWarning {
    #[error("page {index} repeats URL {url}")]
    DuplicateUrl { index: usize, url: String },

    #[error("page {index} has no offset marker: {url}")]
    MissingMarker { index: usize, url: String },

    #[error("page {index} has offset {offset}, not above the previous offset {previous}")]
    NonIncreasingOffset {
        index: usize,
        previous: u32,
        offset: u32,
    },
}

/// Ordered list of page URLs for one seed
///
/// The first page is always the seed URL at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrlSequence {
    pages: Vec<PageUrl>,
}

impl PageUrlSequence {
    /// Number of pages in the sequence (always at least one)
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// A sequence always contains the seed page
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageUrl] {
        &self.pages
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.url.as_str())
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.pages.iter().map(|page| page.offset).collect()
    }

    /// Checks the URLs actually produced by the template
    ///
    /// The computed offsets are always `0, 15, 30, …`; this looks at what the
    /// URLs themselves encode, which only diverges when the template is malformed.
    pub fn integrity_warnings(&self) -> Vec<SequenceIntegrityWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut previous: Option<u32> = None;

        for (index, page) in self.pages.iter().enumerate() {
            if !seen.insert(page.url.as_str()) {
                warnings.push(SequenceIntegrityWarning::DuplicateUrl {
                    index,
                    url: page.url.clone(),
                });
            }

            // The seed URL usually has no marker and stands for offset 0
            let observed = match (index, offset_of(&page.url)) {
                (_, Some(offset)) => offset,
                (0, None) => 0,
                (_, None) => {
                    warnings.push(SequenceIntegrityWarning::MissingMarker {
                        index,
                        url: page.url.clone(),
                    });
                    continue;
                }
            };

            if let Some(previous) = previous {
                if observed <= previous {
                    warnings.push(SequenceIntegrityWarning::NonIncreasingOffset {
                        index,
                        previous,
                        offset: observed,
                    });
                }
            }
            previous = Some(observed);
        }

        warnings
    }

    /// Returns the pages with repeated URLs removed, keeping the first occurrence
    pub fn distinct(&self) -> Vec<PageUrl> {
        let mut seen = HashSet::new();
        self.pages
            .iter()
            .filter(|page| seen.insert(page.url.as_str()))
            .cloned()
            .collect()
    }
}

/// Number of pages to visit for a listing
///
/// A listing without reviews, or one that exposes no second page, has a single page.
pub fn page_count(total_count: u32, has_template: bool) -> u32 {
    if total_count == 0 || !has_template {
        1
    } else {
        total_count.div_ceil(PAGE_SIZE)
    }
}

/// Derives the ordered page URLs for a seed
///
/// # Arguments
///
/// * `seed_url` - The listing URL; always the first page
/// * `total_count` - Total number of reviews reported by the listing
/// * `offset_template_url` - URL of any paginated page, if the listing has more than one
///
/// # Examples
///
/// ```
/// use review_harvest::pagination::sequence;
///
/// let pages = sequence(
///     "https://example.com/R-g1-d2-Reviews-Name-City.html",
///     31,
///     Some("https://example.com/R-g1-d2-Reviews-or10-Name-City.html"),
/// );
/// assert_eq!(pages.offsets(), vec![0, 15, 30]);
/// ```
pub fn sequence(
    seed_url: &str,
    total_count: u32,
    offset_template_url: Option<&str>,
) -> PageUrlSequence {
    let mut pages = vec![PageUrl {
        offset: 0,
        url: seed_url.to_string(),
    }];

    if let Some(template) = offset_template_url {
        let count = page_count(total_count, true);
        pages.extend((1..count).map(|k| {
            let offset = k * PAGE_SIZE;
            PageUrl {
                offset,
                url: apply_offset(template, offset),
            }
        }));
    }

    PageUrlSequence { pages }
}
