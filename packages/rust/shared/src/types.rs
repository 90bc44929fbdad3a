//! Core domain types for releasewatch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Base URL that relative catalog links resolve against.
pub const SITE_BASE_URL: &str = "https://rateyourmusic.com";

/// Separator used when a release credits multiple artists.
pub const ARTIST_JOIN: &str = " & ";

/// Placeholder rating for chart entries with no published average.
pub const RATING_UNAVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Which page layout a release record was extracted from.
///
/// Closed set on purpose: the report renderer matches exhaustively, so a new
/// kind cannot ship without deciding its rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Tabular list page.
    Listing,
    /// Chart grid page.
    Chart,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Listing => write!(f, "listing"),
            SourceKind::Chart => write!(f, "chart"),
        }
    }
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// A single extracted release, the unit of data through the whole pipeline.
///
/// Serialized into the daily snapshot files; older files may lack the
/// chart-only fields, so those default on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Credited artist(s); multiple artists joined with [`ARTIST_JOIN`].
    pub artist: String,
    /// Album title.
    pub album: String,
    /// Absolute URL of the album page, or empty when none was present.
    #[serde(default)]
    pub link: String,
    /// Whether this release was absent from the diff baseline.
    #[serde(default = "default_true")]
    pub is_new: bool,
    /// Calendar date of the run that captured this record.
    pub captured_on: NaiveDate,
    /// Snapshot file the record came from, for traceability.
    #[serde(default)]
    pub source_origin: String,
    /// Page layout the record was extracted from.
    pub source_kind: SourceKind,
    /// Chart average rating ([`RATING_UNAVAILABLE`] when unpublished);
    /// listing records carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Primary genres in page order; listing records carry none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Release {
    /// Identity key for dedup and diffing, or `None` when either side
    /// normalizes to empty. Keyless records cannot be reconciled.
    pub fn key(&self) -> Option<ReleaseKey> {
        ReleaseKey::new(&self.artist, &self.album)
    }
}

// ---------------------------------------------------------------------------
// ReleaseKey
// ---------------------------------------------------------------------------

/// Normalized (artist, album) identity pair.
///
/// Kept as a structured pair rather than a joined string so that field
/// boundaries survive normalization: ("ab", "c") and ("a", "bc") must not
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseKey {
    artist: String,
    album: String,
}

impl ReleaseKey {
    /// Build a key from raw artist/album text. Returns `None` when either
    /// side is empty after trimming and case-folding.
    pub fn new(artist: &str, album: &str) -> Option<Self> {
        let artist = normalize(artist);
        let album = normalize(album);
        if artist.is_empty() || album.is_empty() {
            return None;
        }
        Some(Self { artist, album })
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
