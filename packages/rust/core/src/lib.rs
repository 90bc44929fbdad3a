//! Core pipeline orchestration for releasewatch.
//!
//! Ties the snapshot loader, page extractors, reconciliation passes, and
//! report rendering into one end-to-end batch run (`process_snapshots`).

pub mod history;
pub mod pipeline;
pub mod reconcile;
