//! Snapshot loading: locating saved catalog pages and decoding them to markup.
//!
//! Capture runs drop files into a snapshot directory as either plain markup
//! (`.html`/`.htm`) or archived-page containers (`.mhtml`/`.mht`). This
//! crate finds those files and turns each one into parsable HTML text.

pub mod mhtml;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use releasewatch_shared::{ReleaseWatchError, Result};

/// File extensions recognized as page snapshots.
const SNAPSHOT_EXTENSIONS: &[&str] = &["html", "htm", "mhtml", "mht"];

/// A decoded page snapshot ready for extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// The markup text.
    pub html: String,
    /// File name the document came from.
    pub origin: String,
}

/// List the snapshot files in a directory, sorted by file name so the
/// processing order is deterministic.
pub fn find_snapshot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReleaseWatchError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReleaseWatchError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let recognized = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SNAPSHOT_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)));
        if recognized {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load one snapshot file and decode it to markup.
///
/// Plain `.html`/`.htm` files are read as text. Archived-page containers
/// (`.mhtml`/`.mht`) are unpacked via [`mhtml::extract_html`]; a container
/// without a markup part yields `Ok(None)` and contributes zero records.
pub fn load_document(path: &Path) -> Result<Option<RawDocument>> {
    let origin = file_name(path);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    // Lossy read: container structure is ASCII, and stray bytes in a plain
    // page must not abort the whole run.
    let bytes = std::fs::read(path).map_err(|e| ReleaseWatchError::io(path, e))?;
    let raw = String::from_utf8_lossy(&bytes).into_owned();

    let html = match ext.as_str() {
        "mhtml" | "mht" => match mhtml::extract_html(&raw)? {
            Some(html) => html,
            None => {
                warn!(file = %origin, "container has no text/html part, skipping");
                return Ok(None);
            }
        },
        _ => raw,
    };

    debug!(file = %origin, bytes = html.len(), "snapshot decoded");
    Ok(Some(RawDocument { html, origin }))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(format!("../../../fixtures/{name}"))
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("releasewatch-snap-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn finds_snapshot_files_sorted() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("b-page.html"), "<html></html>").unwrap();
        std::fs::write(tmp.join("a-page.mhtml"), "stub").unwrap();
        std::fs::write(tmp.join("chart.MHT"), "stub").unwrap();
        std::fs::write(tmp.join("notes.txt"), "not a snapshot").unwrap();
        std::fs::create_dir_all(tmp.join("sub.html")).unwrap();

        let files = find_snapshot_files(&tmp).expect("scan");
        let names: Vec<String> = files.iter().map(|p| super::file_name(p)).collect();
        assert_eq!(names, vec!["a-page.mhtml", "b-page.html", "chart.MHT"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = temp_dir();
        let _ = std::fs::remove_dir_all(&tmp);
        assert!(find_snapshot_files(&tmp).is_err());
    }

    #[test]
    fn loads_plain_html() {
        let tmp = temp_dir();
        let path = tmp.join("page.html");
        std::fs::write(&path, "<html><body>plain</body></html>").unwrap();

        let doc = load_document(&path).expect("load").expect("document");
        assert_eq!(doc.origin, "page.html");
        assert!(doc.html.contains("plain"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn loads_archived_container_fixture() {
        let path = fixture_path("mhtml/chart_week34.mhtml");
        let doc = load_document(&path).expect("load").expect("document");
        assert_eq!(doc.origin, "chart_week34.mhtml");
        assert!(doc.html.contains("page_charts_section_charts"));
        // Quoted-printable `=3D` sequences must come out as plain `=`.
        assert!(doc.html.contains("class=\"page_charts_section_charts_item"));
        assert!(!doc.html.contains("=3D"));
    }

    #[test]
    fn container_without_markup_yields_none() {
        let tmp = temp_dir();
        let path = tmp.join("images-only.mhtml");
        let raw = "MIME-Version: 1.0\n\
                   Content-Type: multipart/related; boundary=\"b1\"\n\
                   \n\
                   --b1\n\
                   Content-Type: image/png\n\
                   Content-Transfer-Encoding: base64\n\
                   \n\
                   aGVsbG8=\n\
                   --b1--\n";
        std::fs::write(&path, raw).unwrap();

        let doc = load_document(&path).expect("load");
        assert!(doc.is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn corrupt_container_is_an_error() {
        let tmp = temp_dir();
        let path = tmp.join("broken.mht");
        std::fs::write(&path, "this is not a MIME container").unwrap();

        assert!(load_document(&path).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
