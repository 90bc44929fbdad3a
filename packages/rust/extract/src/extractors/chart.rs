//! Chart-grid extractor.

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use releasewatch_shared::{RATING_UNAVAILABLE, Release, SourceKind};

use super::{ExtractContext, PageExtractor, element_text, resolve_link};

/// Extracts release entries from chart grid pages.
pub struct ChartExtractor;

impl PageExtractor for ChartExtractor {
    fn detect(&self, doc: &Html) -> bool {
        let section_sel = Selector::parse("section#page_charts_section_charts").unwrap();
        doc.select(&section_sel).next().is_some()
    }

    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Vec<Release> {
        let item_sel = Selector::parse(
            "section#page_charts_section_charts div.page_charts_section_charts_item",
        )
        .unwrap();

        let mut releases = Vec::new();
        for item in doc.select(&item_sel) {
            match extract_item(&item, ctx) {
                Some(release) => releases.push(release),
                None => {
                    trace!(file = %ctx.origin, "chart item lacks title or credited artist, skipped")
                }
            }
        }

        releases
    }

    fn name(&self) -> &str {
        "chart"
    }
}

/// Pull one release out of a chart item container.
/// Returns `None` when the title or the credited-artist block is missing;
/// both are mandatory for chart records.
fn extract_item(item: &ElementRef, ctx: &ExtractContext) -> Option<Release> {
    let title_sel = Selector::parse("span.ui_name_locale_original").unwrap();
    let credited_sel =
        Selector::parse("div.page_charts_section_charts_item_credited_text").unwrap();
    let link_sel = Selector::parse("a.page_charts_section_charts_item_link").unwrap();
    let rating_sel =
        Selector::parse("span.page_charts_section_charts_item_details_average_num").unwrap();
    let genre_sel =
        Selector::parse("div.page_charts_section_charts_item_genres_primary a.genre").unwrap();

    // The first locale-original span in the item is the album title; the
    // credited block carries its own further down.
    let album = item.select(&title_sel).next().map(|el| element_text(&el))?;

    let credited = item.select(&credited_sel).next()?;
    let artist = credited
        .select(&title_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| element_text(&credited));

    let link = item
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(resolve_link)
        .unwrap_or_default();

    let rating = item
        .select(&rating_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_else(|| RATING_UNAVAILABLE.to_string());

    let genres = item.select(&genre_sel).map(|a| element_text(&a)).collect();

    Some(Release {
        artist,
        album,
        link,
        is_new: true,
        captured_on: ctx.today,
        source_origin: ctx.origin.clone(),
        source_kind: SourceKind::Chart,
        rating: Some(rating),
        genres,
    })
}
