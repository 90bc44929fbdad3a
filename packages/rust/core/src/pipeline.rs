//! End-to-end processing pipeline: snapshots → extraction → reconcile → report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use releasewatch_extract::{extract_document, ExtractContext};
use releasewatch_shared::{Release, Result};
use releasewatch_snapshot::{find_snapshot_files, load_document};

use crate::history;
use crate::reconcile;

/// Configuration for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Directory holding captured page snapshots.
    pub snapshot_dir: PathBuf,
    /// Directory for daily snapshots and reports.
    pub data_dir: PathBuf,
    /// Calendar date stamped onto this run's records and output files.
    pub today: NaiveDate,
}

impl ProcessConfig {
    /// Config for a run dated today, local time.
    pub fn new(snapshot_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            snapshot_dir,
            data_dir,
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Result of one processing run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Snapshot files found in the snapshot directory.
    pub files_found: usize,
    /// Files that decoded and went through extraction.
    pub files_processed: usize,
    /// Records extracted, before deduplication.
    pub records_extracted: usize,
    /// Records surviving deduplication.
    pub unique_records: usize,
    /// Records absent from the baseline.
    pub new_records: usize,
    /// The reconciled record set.
    pub releases: Vec<Release>,
    /// Daily snapshot path, when persistence succeeded.
    pub snapshot_path: Option<PathBuf>,
    /// Report path, when the report was written.
    pub report_path: Option<PathBuf>,
    /// Persistence failure, surfaced for the caller to act on.
    pub persist_error: Option<String>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each snapshot file is processed.
    fn file_processed(&self, name: &str, records: usize, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_processed(&self, _name: &str, _records: usize, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Run the full processing pipeline.
///
/// 1. Scan the snapshot directory
/// 2. Decode and extract each file
/// 3. Deduplicate across sources
/// 4. Diff against the historical baseline
/// 5. Persist the daily snapshot and write the report
///
/// A run that extracts zero records stops after step 2 without touching the
/// data directory: a broken capture must not overwrite history with an
/// empty day.
#[instrument(skip_all, fields(snapshots = %config.snapshot_dir.display(), date = %config.today))]
pub fn process_snapshots(
    config: &ProcessConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();

    info!(data_dir = %config.data_dir.display(), "starting processing run");

    // --- Phase 1: Scan ---
    progress.phase("Scanning snapshots");
    let files = find_snapshot_files(&config.snapshot_dir)?;

    if files.is_empty() {
        warn!(dir = %config.snapshot_dir.display(), "no snapshot files found");
        let summary = RunSummary {
            elapsed: start.elapsed(),
            ..Default::default()
        };
        progress.done(&summary);
        return Ok(summary);
    }

    // --- Phase 2: Extract ---
    progress.phase("Extracting releases");
    let total = files.len();
    let mut extracted: Vec<Release> = Vec::new();
    let mut files_processed = 0;

    for (i, path) in files.iter().enumerate() {
        let label = file_label(path);
        let document = match load_document(path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                progress.file_processed(&label, 0, i + 1, total);
                continue;
            }
            Err(e) => {
                warn!(file = %label, error = %e, "cannot decode snapshot, skipping");
                progress.file_processed(&label, 0, i + 1, total);
                continue;
            }
        };

        let ctx = ExtractContext {
            origin: document.origin.clone(),
            today: config.today,
        };
        let records = extract_document(&document.html, &ctx);
        files_processed += 1;

        progress.file_processed(&label, records.len(), i + 1, total);
        extracted.extend(records);
    }

    let records_extracted = extracted.len();
    if records_extracted == 0 {
        warn!("no releases extracted from any snapshot, keeping history untouched");
        let summary = RunSummary {
            files_found: total,
            files_processed,
            elapsed: start.elapsed(),
            ..Default::default()
        };
        progress.done(&summary);
        return Ok(summary);
    }

    // --- Phase 3: Reconcile ---
    progress.phase("Reconciling records");
    let (unique, dedup) = reconcile::dedupe(extracted);

    // --- Phase 4: Diff against history ---
    progress.phase("Diffing against history");
    let baseline = match history::baseline_path(&config.data_dir, config.today) {
        Ok(Some(path)) => history::load_baseline(&path),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "cannot scan history directory, diffing without a baseline");
            None
        }
    };
    let (releases, new_records) = reconcile::mark_new_against(baseline.as_deref(), unique);

    // --- Phase 5: Persist & report ---
    progress.phase("Writing snapshot and report");
    let (snapshot_path, persist_error) =
        match history::write_snapshot(&config.data_dir, config.today, &releases) {
            Ok(path) => (Some(path), None),
            Err(e) => (None, Some(e.to_string())),
        };

    let report_path = write_report(config, &releases);

    let summary = RunSummary {
        files_found: total,
        files_processed,
        records_extracted,
        unique_records: releases.len(),
        new_records,
        releases,
        snapshot_path,
        report_path,
        persist_error,
        elapsed: start.elapsed(),
    };

    progress.done(&summary);

    info!(
        files = summary.files_found,
        extracted = summary.records_extracted,
        unique = summary.unique_records,
        duplicates = dedup.duplicates,
        unkeyed = dedup.unkeyed,
        new = summary.new_records,
        elapsed_ms = summary.elapsed.as_millis(),
        "processing run complete"
    );

    Ok(summary)
}

/// Render and write the new-releases report.
///
/// A write failure is logged and leaves the path empty; the run's data is
/// already persisted by then.
fn write_report(config: &ProcessConfig, releases: &[Release]) -> Option<PathBuf> {
    let html = releasewatch_report::render_new_releases(releases, config.today);
    let path = config
        .data_dir
        .join(releasewatch_report::report_file_name(config.today));

    match std::fs::write(&path, html) {
        Ok(()) => {
            info!(path = %path.display(), "report written");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot write report");
            None
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
