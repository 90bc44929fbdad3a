//! Shared types, error model, and configuration for releasewatch.
//!
//! This crate is the foundation depended on by all other releasewatch crates.
//! It provides:
//! - [`ReleaseWatchError`] — the unified error type
//! - Domain types ([`Release`], [`ReleaseKey`], [`SourceKind`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PathsConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{ReleaseWatchError, Result};
pub use types::{ARTIST_JOIN, RATING_UNAVAILABLE, Release, ReleaseKey, SITE_BASE_URL, SourceKind};
