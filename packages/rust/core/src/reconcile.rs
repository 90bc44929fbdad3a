//! Record reconciliation: cross-source dedup and historical diffing.
//!
//! Both passes are pure value-in/value-out so each stage can be tested on
//! its own, with the pipeline threading the record set between them.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use releasewatch_shared::{Release, ReleaseKey, SourceKind};

/// Counts from one dedup pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct DedupSummary {
    /// Records surviving the pass.
    pub kept: usize,
    /// Records merged away as duplicates.
    pub duplicates: usize,
    /// Records dropped for lacking a usable identity key.
    pub unkeyed: usize,
}

/// Deduplicate extracted records by identity key, preserving first-seen
/// order.
///
/// A chart record replaces a listing record under the same key (it carries
/// rating and genre data the listing lacks); within the same kind the first
/// record seen wins. Records whose key is `None` cannot be reconciled and
/// are dropped.
pub fn dedupe(records: Vec<Release>) -> (Vec<Release>, DedupSummary) {
    let mut kept: Vec<Release> = Vec::with_capacity(records.len());
    let mut slots: HashMap<ReleaseKey, usize> = HashMap::new();
    let mut summary = DedupSummary::default();

    for record in records {
        let Some(key) = record.key() else {
            warn!(
                artist = %record.artist,
                album = %record.album,
                origin = %record.source_origin,
                "dropping record without usable identity key"
            );
            summary.unkeyed += 1;
            continue;
        };

        match slots.get(&key) {
            None => {
                slots.insert(key, kept.len());
                kept.push(record);
            }
            Some(&slot) => {
                summary.duplicates += 1;
                if record.source_kind == SourceKind::Chart
                    && kept[slot].source_kind == SourceKind::Listing
                {
                    kept[slot] = record;
                }
            }
        }
    }

    summary.kept = kept.len();
    debug!(
        kept = summary.kept,
        duplicates = summary.duplicates,
        unkeyed = summary.unkeyed,
        "dedup pass complete"
    );
    (kept, summary)
}

/// Flag each record as new or previously seen against a baseline set.
///
/// With no baseline (first run, or an unreadable baseline file) every record
/// is new. Returns the updated records and the new-record count.
pub fn mark_new_against(
    baseline: Option<&[Release]>,
    mut records: Vec<Release>,
) -> (Vec<Release>, usize) {
    let baseline_keys: HashSet<ReleaseKey> = baseline
        .unwrap_or_default()
        .iter()
        .filter_map(Release::key)
        .collect();

    let mut new_count = 0;
    for record in &mut records {
        let seen = record
            .key()
            .is_some_and(|key| baseline_keys.contains(&key));
        record.is_new = !seen;
        if record.is_new {
            new_count += 1;
        }
    }

    debug!(
        total = records.len(),
        baseline = baseline_keys.len(),
        new = new_count,
        "baseline diff complete"
    );
    (records, new_count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn make_release(artist: &str, album: &str, kind: SourceKind) -> Release {
        Release {
            artist: artist.into(),
            album: album.into(),
            link: format!("https://rateyourmusic.com/release/album/{artist}/{album}/"),
            is_new: true,
            captured_on: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
            source_origin: "page.html".into(),
            source_kind: kind,
            rating: None,
            genres: Vec::new(),
        }
    }

    #[test]
    fn chart_record_wins_regardless_of_order() {
        let listing = make_release("Artist X", "Album Y", SourceKind::Listing);
        let chart = make_release("Artist X", "Album Y", SourceKind::Chart);

        let (kept, summary) = dedupe(vec![listing.clone(), chart.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_kind, SourceKind::Chart);
        assert_eq!(summary.duplicates, 1);

        let (kept, _) = dedupe(vec![chart, listing]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_kind, SourceKind::Chart);
    }

    #[test]
    fn first_record_wins_within_a_kind() {
        let mut first = make_release("Burial", "Antidawn", SourceKind::Listing);
        first.source_origin = "monday.html".into();
        let mut second = make_release("Burial", "Antidawn", SourceKind::Listing);
        second.source_origin = "tuesday.html".into();

        let (kept, summary) = dedupe(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_origin, "monday.html");
        assert_eq!(summary.duplicates, 1);
    }

    #[test]
    fn key_matching_ignores_case_and_padding() {
        let a = make_release("The Cure", "Songs of a Lost World", SourceKind::Listing);
        let b = make_release("  the cure ", "SONGS OF A LOST WORLD", SourceKind::Listing);

        let (kept, _) = dedupe(vec![a, b]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn unkeyed_records_are_dropped() {
        let keyless = make_release("", "Orphan Album", SourceKind::Listing);
        let blank = make_release("Some Artist", "   ", SourceKind::Listing);
        let keyed = make_release("Some Artist", "Real Album", SourceKind::Listing);

        let (kept, summary) = dedupe(vec![keyless, blank, keyed]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].album, "Real Album");
        assert_eq!(summary.unkeyed, 2);
        assert_eq!(summary.duplicates, 0);
    }

    #[test]
    fn preserves_first_seen_order() {
        let records = vec![
            make_release("Alpha", "One", SourceKind::Listing),
            make_release("Beta", "Two", SourceKind::Listing),
            make_release("Alpha", "One", SourceKind::Listing),
            make_release("Gamma", "Three", SourceKind::Listing),
        ];

        let (kept, _) = dedupe(records);
        let artists: Vec<&str> = kept.iter().map(|r| r.artist.as_str()).collect();
        assert_eq!(artists, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn chart_replacement_keeps_slot_position() {
        let records = vec![
            make_release("Alpha", "One", SourceKind::Listing),
            make_release("Beta", "Two", SourceKind::Listing),
            make_release("Alpha", "One", SourceKind::Chart),
        ];

        let (kept, _) = dedupe(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].artist, "Alpha");
        assert_eq!(kept[0].source_kind, SourceKind::Chart);
        assert_eq!(kept[1].artist, "Beta");
    }

    #[test]
    fn dedup_is_idempotent() {
        let records = vec![
            make_release("Alpha", "One", SourceKind::Listing),
            make_release("Alpha", "One", SourceKind::Chart),
            make_release("Beta", "Two", SourceKind::Listing),
        ];

        let (once, _) = dedupe(records);
        let (twice, summary) = dedupe(once.clone());

        assert_eq!(summary.duplicates, 0);
        assert_eq!(summary.unkeyed, 0);
        assert_eq!(once.len(), twice.len());
        let keys_once: Vec<_> = once.iter().filter_map(Release::key).collect();
        let keys_twice: Vec<_> = twice.iter().filter_map(Release::key).collect();
        assert_eq!(keys_once, keys_twice);
    }

    #[test]
    fn no_baseline_marks_everything_new() {
        let records = vec![
            make_release("Artist1", "AlbumA", SourceKind::Listing),
            make_release("Artist2", "AlbumB", SourceKind::Listing),
        ];

        let (marked, new_count) = mark_new_against(None, records);
        assert_eq!(new_count, 2);
        assert!(marked.iter().all(|r| r.is_new));
    }

    #[test]
    fn baseline_filters_previously_seen_keys() {
        let baseline = vec![make_release("a", "x", SourceKind::Listing)];
        let records = vec![
            make_release("a", "x", SourceKind::Listing),
            make_release("b", "y", SourceKind::Listing),
        ];

        let (marked, new_count) = mark_new_against(Some(&baseline), records);
        assert_eq!(new_count, 1);
        assert!(!marked[0].is_new);
        assert!(marked[1].is_new);
    }

    #[test]
    fn baseline_matching_is_normalized() {
        let baseline = vec![make_release("ALVVAYS", "BLUE REV", SourceKind::Chart)];
        let records = vec![make_release("alvvays", "blue rev", SourceKind::Listing)];

        let (marked, new_count) = mark_new_against(Some(&baseline), records);
        assert_eq!(new_count, 0);
        assert!(!marked[0].is_new);
    }
}
