//! Layout extractor trait and built-in extractors for catalog pages.
//!
//! Extractors detect the two known page layouts (chart grid, listing table)
//! and pull release records out of each. Chart is tried first, so a page
//! carrying both structures yields chart-kind records.

mod chart;
mod listing;

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use url::Url;

use releasewatch_shared::{Release, SITE_BASE_URL};

pub use chart::ChartExtractor;
pub use listing::ListingExtractor;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Per-run context threaded to every extractor.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// Snapshot file name the document came from.
    pub origin: String,
    /// Calendar date stamped onto extracted records.
    pub today: NaiveDate,
}

/// Trait for layout-specific release extraction.
///
/// Extractors are tried in priority order; a document matching none is
/// reported as unrecognized by the registry.
pub trait PageExtractor: Send + Sync {
    /// Try to detect this layout in the parsed document.
    /// Returns `true` if this extractor should handle the document.
    fn detect(&self, doc: &Html) -> bool;

    /// Extract every release record from the document.
    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Vec<Release>;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered extractors in priority order.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn PageExtractor>>,
}

impl ExtractorRegistry {
    /// Create a registry with the built-in extractors, chart first.
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(ChartExtractor), Box::new(ListingExtractor)],
        }
    }

    /// Detect the extractor for the given document, if any layout matches.
    /// There is no catch-all; a document matching neither layout is
    /// unrecognized and yields no records.
    pub fn detect(&self, doc: &Html) -> Option<&dyn PageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.detect(doc))
            .map(|e| e.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Site base that relative album links resolve against.
static SITE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(SITE_BASE_URL).expect("valid site base URL"));

/// Collect an element's text with runs of whitespace collapsed to single spaces.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a possibly relative href against the site base. Absolute hrefs
/// pass through unchanged.
pub(crate) fn resolve_link(href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http") {
        return href.to_string();
    }
    match SITE_BASE.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{SITE_BASE_URL}{href}"),
    }
}
