//! Centralized path functions for transcript storage and config locations.
//!
//! Single source of truth for the `{dir}/{session_id}.md` layout: the tail
//! generator's pointer line and the retention manager must agree on it.

use std::path::{Path, PathBuf};

/// File extension of stored transcripts (without the dot).
pub const TRANSCRIPT_EXTENSION: &str = "md";

/// Transcript location for a session: `{dir}/{session_id}.md`.
pub fn transcript_path(dir: &str, session_id: &str) -> String {
    format!("{dir}/{session_id}.{TRANSCRIPT_EXTENSION}")
}

/// Same layout as [`transcript_path`], as a filesystem path.
pub fn transcript_file(dir: &Path, session_id: &str) -> PathBuf {
    dir.join(format!("{session_id}.{TRANSCRIPT_EXTENSION}"))
}

/// App data root: `~/Library/Application Support/compaction-recall/` (macOS)
/// or `~/.local/share/compaction-recall/` (Linux).
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("compaction-recall"))
}

/// Default transcript directory: `<app_data_dir>/transcripts/`.
pub fn default_transcript_dir() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("transcripts"))
}

/// Default config file: `<config dir>/compaction-recall/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("compaction-recall").join("config.toml"))
}
