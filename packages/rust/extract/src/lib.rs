//! Page classification and release extraction.
//!
//! This crate provides:
//! - [`extractors`] — Layout-specific release extractors (chart grid, listing table)
//! - [`ExtractorRegistry`] — Detects which extractor handles a given document
//! - [`extract_document`] — One-shot classify-and-extract entry point

pub mod extractors;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use releasewatch_shared::Release;

pub use extractors::{
    ChartExtractor, ExtractContext, ExtractorRegistry, ListingExtractor, PageExtractor,
};

/// Classify a document and extract its release records.
///
/// An unrecognized layout produces an empty set with a diagnostic log,
/// never an error: a markup change upstream must not abort the run.
pub fn extract_document(html: &str, ctx: &ExtractContext) -> Vec<Release> {
    let doc = Html::parse_document(html);
    let registry = ExtractorRegistry::new();

    match registry.detect(&doc) {
        Some(extractor) => {
            let records = extractor.extract(&doc, ctx);
            debug!(
                extractor = extractor.name(),
                records = records.len(),
                file = %ctx.origin,
                "extraction complete"
            );
            records
        }
        None => {
            // The table count narrows down what the capture actually saved.
            let table_sel = Selector::parse("table").unwrap();
            let tables = doc.select(&table_sel).count();
            warn!(
                file = %ctx.origin,
                tables,
                "unrecognized page layout, no records extracted"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use releasewatch_shared::SourceKind;

    fn load_fixture(name: &str) -> Html {
        let path = format!("../../../fixtures/html/{name}");
        let content =
            std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Html::parse_document(&content)
    }

    fn fixture_text(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn make_ctx() -> ExtractContext {
        ExtractContext {
            origin: "page.html".into(),
            today: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        }
    }

    // -----------------------------------------------------------------------
    // Detection tests
    // -----------------------------------------------------------------------

    #[test]
    fn detect_listing() {
        let doc = load_fixture("listing_page.html");
        let registry = ExtractorRegistry::new();
        let extractor = registry.detect(&doc).expect("layout detected");
        assert_eq!(extractor.name(), "listing");
    }

    #[test]
    fn detect_chart() {
        let doc = load_fixture("chart_page.html");
        let registry = ExtractorRegistry::new();
        let extractor = registry.detect(&doc).expect("layout detected");
        assert_eq!(extractor.name(), "chart");
    }

    #[test]
    fn detect_unrecognized() {
        let doc = load_fixture("unrecognized.html");
        let registry = ExtractorRegistry::new();
        assert!(registry.detect(&doc).is_none());
    }

    #[test]
    fn chart_takes_priority_over_listing() {
        let html = r#"<html><body>
            <section id="page_charts_section_charts"></section>
            <table id="user_list"></table>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let registry = ExtractorRegistry::new();
        let extractor = registry.detect(&doc).expect("layout detected");
        assert_eq!(extractor.name(), "chart");
    }

    // -----------------------------------------------------------------------
    // Listing extraction tests
    // -----------------------------------------------------------------------

    #[test]
    fn listing_extracts_rows() {
        let doc = load_fixture("listing_page.html");
        let records = ListingExtractor.extract(&doc, &make_ctx());

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.source_kind == SourceKind::Listing));
        assert!(records.iter().all(|r| r.rating.is_none()));
        assert!(records.iter().all(|r| r.source_origin == "page.html"));

        assert_eq!(records[0].artist, "Alvvays");
        assert_eq!(records[0].album, "Blue Rev");
        assert_eq!(
            records[0].link,
            "https://rateyourmusic.com/release/album/alvvays/blue-rev/"
        );
    }

    #[test]
    fn listing_joins_credited_artists() {
        let doc = load_fixture("listing_page.html");
        let records = ListingExtractor.extract(&doc, &make_ctx());

        assert_eq!(records[1].artist, "Big Red Machine & Taylor Swift");
        // Already-absolute hrefs pass through untouched.
        assert_eq!(
            records[1].link,
            "https://rateyourmusic.com/release/album/big-red-machine/renegade/"
        );
    }

    #[test]
    fn listing_handles_unlinked_rows() {
        let doc = load_fixture("listing_page.html");
        let records = ListingExtractor.extract(&doc, &make_ctx());

        assert_eq!(records[2].artist, "Unlinked Artist");
        assert_eq!(records[2].album, "Self-Released Demo");
        assert!(records[2].link.is_empty());
    }

    #[test]
    fn listing_stops_at_marker_row() {
        let doc = load_fixture("upcoming_listing.html");
        let records = ListingExtractor.extract(&doc, &make_ctx());

        // Rows [A, B, marker, C] must come out as {A, B}.
        let albums: Vec<&str> = records.iter().map(|r| r.album.as_str()).collect();
        assert_eq!(albums, vec!["Antidawn", "Motomami"]);
    }

    #[test]
    fn marker_requires_exact_cell_text() {
        let html = r#"<html><head><title>New and upcoming albums</title></head><body>
            <table id="user_list">
              <tr><td class="main_entry"><b>Upcoming tours this fall</b></td></tr>
              <tr><td class="main_entry">
                <h2><a class="list_artist" href="/artist/a">A</a></h2>
                <h3><a class="list_album" href="/release/x/">X</a></h3>
              </td></tr>
              <tr><td class="main_entry"><b>Upcoming</b></td></tr>
              <tr><td class="main_entry">
                <h2><a class="list_artist" href="/artist/b">B</a></h2>
                <h3><a class="list_album" href="/release/y/">Y</a></h3>
              </td></tr>
            </table>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let records = ListingExtractor.extract(&doc, &make_ctx());

        // "Upcoming tours this fall" is not an exact marker, so extraction
        // runs past it and stops at the bare "Upcoming" row.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].artist, "A");
    }

    #[test]
    fn marker_ignored_without_denylisted_title() {
        let html = r#"<html><head><title>My favorite albums</title></head><body>
            <table id="user_list">
              <tr><td class="main_entry"><b>Upcoming</b></td></tr>
              <tr><td class="main_entry">
                <h2><a class="list_artist" href="/artist/a">A</a></h2>
                <h3><a class="list_album" href="/release/x/">X</a></h3>
              </td></tr>
            </table>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let records = ListingExtractor.extract(&doc, &make_ctx());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].artist, "A");
    }

    #[test]
    fn listing_collapses_whitespace() {
        let html = r#"<html><body><table id="user_list">
            <tr><td class="main_entry">
              <h2><a class="list_artist" href="/artist/b">  Godspeed
                  You! Black Emperor </a></h2>
              <h3><a class="list_album" href="/release/z/">G_d's Pee</a></h3>
            </td></tr>
        </table></body></html>"#;
        let doc = Html::parse_document(html);
        let records = ListingExtractor.extract(&doc, &make_ctx());

        assert_eq!(records[0].artist, "Godspeed You! Black Emperor");
    }

    // -----------------------------------------------------------------------
    // Chart extraction tests
    // -----------------------------------------------------------------------

    #[test]
    fn chart_extracts_items() {
        let doc = load_fixture("chart_page.html");
        let records = ChartExtractor.extract(&doc, &make_ctx());

        // Four items in the fixture; the one without a credited block drops.
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.source_kind == SourceKind::Chart));

        assert_eq!(records[0].artist, "Turnstile");
        assert_eq!(records[0].album, "Never Enough");
        assert_eq!(records[0].rating.as_deref(), Some("3.85"));
        assert_eq!(records[0].genres, vec!["Post-Hardcore", "Pop Punk"]);
        assert_eq!(
            records[0].link,
            "https://rateyourmusic.com/release/album/turnstile/never-enough/"
        );
    }

    #[test]
    fn chart_credited_text_fallback() {
        let doc = load_fixture("chart_page.html");
        let records = ChartExtractor.extract(&doc, &make_ctx());

        // Second item credits the artist as bare text, no locale span.
        assert_eq!(records[1].artist, "Sault");
        assert_eq!(records[1].rating.as_deref(), Some("4.02"));
    }

    #[test]
    fn chart_defaults_missing_rating_and_genres() {
        let doc = load_fixture("chart_page.html");
        let records = ChartExtractor.extract(&doc, &make_ctx());

        assert_eq!(records[2].artist, "Quiet Pines");
        assert_eq!(records[2].rating.as_deref(), Some("N/A"));
        assert!(records[2].genres.is_empty());
    }

    #[test]
    fn chart_skips_item_without_title() {
        let html = r#"<html><body><section id="page_charts_section_charts">
            <div class="page_charts_section_charts_item">
              <div class="page_charts_section_charts_item_credited_text">Ghost Artist</div>
            </div>
        </section></body></html>"#;
        let doc = Html::parse_document(html);
        let records = ChartExtractor.extract(&doc, &make_ctx());
        assert!(records.is_empty());
    }

    // -----------------------------------------------------------------------
    // Entry point tests
    // -----------------------------------------------------------------------

    #[test]
    fn extract_document_routes_to_listing() {
        let records = extract_document(&fixture_text("listing_page.html"), &make_ctx());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].source_kind, SourceKind::Listing);
    }

    #[test]
    fn extract_document_unrecognized_yields_nothing() {
        let records = extract_document(&fixture_text("unrecognized.html"), &make_ctx());
        assert!(records.is_empty());
    }
}
