//! Listing-table extractor.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use releasewatch_shared::{ARTIST_JOIN, Release, SourceKind};

use super::{ExtractContext, PageExtractor, element_text, resolve_link};

/// Known list titles whose trailing section must not be extracted, mapped to
/// the row markers that open that section. A title matches by
/// case-insensitive substring against the page `<title>`; a marker matches
/// when a row's main-entry cell text equals it, case-insensitively.
/// Extraction stops at the first marker row; everything after is ignored.
const STOP_MARKERS: &[(&str, &[&str])] =
    &[("new and upcoming", &["upcoming", "upcoming releases"])];

/// Extracts release rows from tabular list pages.
pub struct ListingExtractor;

impl PageExtractor for ListingExtractor {
    fn detect(&self, doc: &Html) -> bool {
        // The table id is the stable hook; its classes are styling-only.
        let table_sel = Selector::parse("table#user_list").unwrap();
        doc.select(&table_sel).next().is_some()
    }

    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Vec<Release> {
        let row_sel = Selector::parse("table#user_list tr").unwrap();
        let entry_sel = Selector::parse("td.main_entry").unwrap();

        let markers = stop_markers_for(doc);
        let mut releases = Vec::new();

        for row in doc.select(&row_sel) {
            let Some(entry) = row.select(&entry_sel).next() else {
                continue; // header/spacer rows carry no main-entry cell
            };

            if !markers.is_empty() {
                let cell_text = element_text(&entry).to_lowercase();
                if let Some(&marker) = markers.iter().find(|m| cell_text == **m) {
                    debug!(file = %ctx.origin, marker, "stop marker row reached, ending extraction");
                    break;
                }
            }

            match extract_row(&entry, ctx) {
                Some(release) => releases.push(release),
                None => trace!(file = %ctx.origin, "row lacks artist/album headings, skipped"),
            }
        }

        releases
    }

    fn name(&self) -> &str {
        "listing"
    }
}

/// Look up the stop markers for this document, if its title is one of the
/// known special cases.
fn stop_markers_for(doc: &Html) -> &'static [&'static str] {
    let title_sel = Selector::parse("title").unwrap();
    let Some(title_el) = doc.select(&title_sel).next() else {
        return &[];
    };

    let title = element_text(&title_el).to_lowercase();
    for (pattern, markers) in STOP_MARKERS {
        if title.contains(pattern) {
            return markers;
        }
    }
    &[]
}

/// Pull one release out of a qualifying row's main-entry cell.
/// Returns `None` when the cell lacks the artist or album heading.
fn extract_row(entry: &ElementRef, ctx: &ExtractContext) -> Option<Release> {
    let h2_sel = Selector::parse("h2").unwrap();
    let h3_sel = Selector::parse("h3").unwrap();
    let credited_sel = Selector::parse("span.credited_name").unwrap();
    let artist_sel = Selector::parse("a.list_artist").unwrap();
    let album_sel = Selector::parse("a.list_album").unwrap();

    let h2 = entry.select(&h2_sel).next()?;
    let h3 = entry.select(&h3_sel).next()?;

    // Multi-artist credits wrap the artist links in a credited-name span.
    let artist = if h2.select(&credited_sel).next().is_some() {
        let names: Vec<String> = h2.select(&artist_sel).map(|a| element_text(&a)).collect();
        names.join(ARTIST_JOIN)
    } else {
        h2.select(&artist_sel)
            .next()
            .map(|a| element_text(&a))
            .unwrap_or_else(|| element_text(&h2))
    };

    let (album, link) = match h3.select(&album_sel).next() {
        Some(a) => {
            let href = a.value().attr("href").unwrap_or("");
            (element_text(&a), resolve_link(href))
        }
        None => (element_text(&h3), String::new()),
    };

    Some(Release {
        artist,
        album,
        link,
        is_new: true,
        captured_on: ctx.today,
        source_origin: ctx.origin.clone(),
        source_kind: SourceKind::Listing,
        rating: None,
        genres: Vec::new(),
    })
}
