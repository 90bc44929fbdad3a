//! Daily snapshot persistence and diff-baseline selection.
//!
//! One JSON file per calendar day (`albums-YYYY-MM-DD.json`); a same-day
//! rerun overwrites its own file. Baseline selection goes by the date in the
//! file name, not filesystem timestamps, so restored or copied data
//! directories still diff correctly.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, warn};

use releasewatch_shared::{Release, ReleaseWatchError, Result};

/// Matches persisted snapshot file names, capturing the date stamp.
static SNAPSHOT_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^albums-(\d{4}-\d{2}-\d{2})\.json$").expect("snapshot file regex")
});

/// File name for the snapshot written on `date`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("albums-{date}.json")
}

/// Pick the diff baseline file for a run dated `today`.
///
/// Prefers today's own file, so a same-day rerun diffs against its earlier
/// pass; otherwise the most recent prior day's file. Future-dated files and
/// anything not matching the snapshot name pattern are ignored.
pub fn baseline_path(data_dir: &Path, today: NaiveDate) -> Result<Option<PathBuf>> {
    let todays = data_dir.join(snapshot_file_name(today));
    if todays.is_file() {
        debug!(path = %todays.display(), "using same-day snapshot as baseline");
        return Ok(Some(todays));
    }

    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        // A first run has no data directory yet; that is not an error.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ReleaseWatchError::io(data_dir, e)),
    };

    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| ReleaseWatchError::io(data_dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = SNAPSHOT_FILE_RE.captures(name) else {
            continue;
        };
        let Ok(date) = caps[1].parse::<NaiveDate>() else {
            continue;
        };
        if date >= today {
            continue;
        }
        if best.as_ref().is_none_or(|(current, _)| date > *current) {
            best = Some((date, path));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Load a baseline snapshot.
///
/// An unreadable or corrupt file is absorbed as "no baseline" (logged), so a
/// damaged history file cannot block the run; everything just counts as new.
pub fn load_baseline(path: &Path) -> Option<Vec<Release>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read baseline snapshot, diffing without one");
            return None;
        }
    };

    match serde_json::from_str::<Vec<Release>>(&content) {
        Ok(releases) => {
            debug!(path = %path.display(), records = releases.len(), "baseline snapshot loaded");
            Some(releases)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "baseline snapshot is not valid JSON, diffing without one");
            None
        }
    }
}

/// Persist the day's reconciled set as pretty-printed JSON.
///
/// Writes to a temp file and renames, so a crash mid-write never leaves a
/// half-written snapshot as the next run's baseline.
pub fn write_snapshot(data_dir: &Path, date: NaiveDate, releases: &[Release]) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir).map_err(|e| ReleaseWatchError::io(data_dir, e))?;

    let file_name = snapshot_file_name(date);
    let target = data_dir.join(&file_name);
    let temp = data_dir.join(format!(".{file_name}.tmp"));

    let json = serde_json::to_string_pretty(releases)
        .map_err(|e| ReleaseWatchError::History(format!("snapshot serialization failed: {e}")))?;

    std::fs::write(&temp, json).map_err(|e| ReleaseWatchError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| ReleaseWatchError::io(&target, e))?;

    info!(path = %target.display(), records = releases.len(), "daily snapshot written");
    Ok(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
