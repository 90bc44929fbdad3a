//! New-release report rendering.
//!
//! Turns a reconciled snapshot set into a standalone HTML page listing the
//! releases first seen in the current run, sorted by artist and grouped
//! under letter headings.

use chrono::NaiveDate;

use releasewatch_shared::{Release, SourceKind, RATING_UNAVAILABLE};

/// Ratings at or above this score get the highlighted style.
pub const HIGH_RATING_THRESHOLD: f64 = 3.60;

/// File name for the report written on `date`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("new_releases-{date}.html")
}

// ---------------------------------------------------------------------------
// Page rendering
// ---------------------------------------------------------------------------

/// Render the new-releases page for one run.
///
/// Only records flagged `is_new` appear. Entries are sorted by case-folded
/// artist; artists whose name does not start with a letter are grouped under
/// a `#` heading.
pub fn render_new_releases(releases: &[Release], date: NaiveDate) -> String {
    let mut new_releases: Vec<&Release> = releases.iter().filter(|r| r.is_new).collect();
    new_releases.sort_by_key(|r| r.artist.to_lowercase());

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("    <meta charset=\"UTF-8\">\n");
    page.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    page.push_str(&format!("    <title>New Music Releases - {date}</title>\n"));
    page.push_str("    <style>\n");
    page.push_str(PAGE_STYLE);
    page.push_str("    </style>\n</head>\n<body>\n");
    page.push_str(&format!("    <h1>New Music Releases - {date}</h1>\n"));
    page.push_str(&format!(
        "    <p>Found {} new releases</p>\n",
        new_releases.len()
    ));

    if new_releases.is_empty() {
        page.push_str("    <p>No new releases found today.</p>\n");
        page.push_str("</body>\n</html>\n");
        return page;
    }

    page.push_str("    <ul>\n");

    let mut current_letter = None;
    for release in new_releases {
        let letter = letter_bucket(&release.artist);
        if current_letter != Some(letter) {
            current_letter = Some(letter);
            page.push_str(&format!(
                "        <li class=\"letter-heading\">{letter}</li>\n"
            ));
        }
        render_entry(&mut page, release);
    }

    page.push_str("    </ul>\n</body>\n</html>\n");
    page
}

/// Render one list entry; chart records carry rating and genre extras.
fn render_entry(page: &mut String, release: &Release) {
    let artist = escape_html(&release.artist);
    let album = album_markup(release);

    match release.source_kind {
        SourceKind::Chart => {
            let rating = release.rating.as_deref().unwrap_or(RATING_UNAVAILABLE);
            let rating_class = if is_high_rating(rating) {
                "rating rating-high"
            } else {
                "rating"
            };

            page.push_str("        <li>\n            <div>\n");
            page.push_str(&format!(
                "                <span class=\"item-main\">{artist} - {album}</span>\n"
            ));
            page.push_str(&format!(
                "                <span class=\"{rating_class}\">{}</span>\n",
                escape_html(rating)
            ));
            page.push_str("                <span class=\"source-type\">Chart</span>\n");
            page.push_str("            </div>\n");
            if !release.genres.is_empty() {
                let genres: Vec<String> = release.genres.iter().map(|g| escape_html(g)).collect();
                page.push_str(&format!(
                    "            <div class=\"genres\">Genres: {}</div>\n",
                    genres.join(", ")
                ));
            }
            page.push_str("        </li>\n");
        }
        SourceKind::Listing => {
            page.push_str(&format!(
                "        <li>\n            {artist} - {album}\n            <span class=\"source-type\">Release</span>\n        </li>\n"
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Album text, linked when the record carries a link.
fn album_markup(release: &Release) -> String {
    let album = escape_html(&release.album);
    if release.link.is_empty() {
        album
    } else {
        format!(
            "<a href=\"{}\" target=\"_blank\">{album}</a>",
            escape_html(&release.link)
        )
    }
}

/// Heading letter for an artist name; `#` for anything not starting with a
/// letter.
fn letter_bucket(artist: &str) -> char {
    match artist.chars().next() {
        Some(c) if c.is_alphabetic() => c.to_uppercase().next().unwrap_or(c),
        _ => '#',
    }
}

fn is_high_rating(rating: &str) -> bool {
    rating
        .parse::<f64>()
        .is_ok_and(|score| score >= HIGH_RATING_THRESHOLD)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_STYLE: &str = "\
        body {
            font-family: Arial, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            color: #333;
            border-bottom: 1px solid #ddd;
            padding-bottom: 10px;
        }
        ul {
            list-style-type: none;
            padding: 0;
        }
        li {
            margin-bottom: 10px;
            padding: 10px;
            background-color: #f9f9f9;
            border-radius: 5px;
        }
        a {
            color: #0066cc;
            text-decoration: none;
        }
        a:hover {
            text-decoration: underline;
        }
        .letter-heading {
            background-color: #333;
            color: white;
            padding: 5px 10px;
            margin-top: 20px;
            border-radius: 3px;
        }
        .item-main {
            margin-right: 10px;
        }
        .rating {
            display: inline-block;
            margin-left: 10px;
            background-color: #e9e9e9;
            padding: 2px 6px;
            border-radius: 3px;
            font-size: 0.9em;
        }
        .rating-high {
            background-color: #c8e6c9;
            color: #2e7d32;
            font-weight: bold;
        }
        .genres {
            font-size: 0.8em;
            color: #555;
            margin-top: 3px;
        }
        .source-type {
            display: inline-block;
            font-size: 0.8em;
            background-color: #eee;
            border-radius: 3px;
            padding: 1px 5px;
            margin-left: 5px;
        }
";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
