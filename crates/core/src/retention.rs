// crates/core/src/retention.rs
//! Transcript persistence and retention.
//!
//! One file per session at `{dir}/{session_id}.md`, overwritten on every
//! write. Pruning keeps the newest `max_count` files and drops anything older
//! than `max_age_days`; either condition alone is enough to remove a file.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::TranscriptError;
use crate::paths::{transcript_file, TRANSCRIPT_EXTENSION};

pub const DEFAULT_MAX_COUNT: usize = 20;
pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Retention policy for the transcript directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneOptions {
    /// Max transcript files to keep
    pub max_count: usize,
    /// Max age in days
    pub max_age_days: u64,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

impl PruneOptions {
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }
}

/// Write a transcript to disk, creating `dir` (and parents) if needed.
///
/// Any existing transcript for the session is replaced.
///
/// # Errors
/// Filesystem failures (permissions, disk full) are returned as-is; nothing
/// is retried.
pub async fn write_transcript(dir: &Path, session_id: &str, content: &str) -> Result<PathBuf, TranscriptError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| TranscriptError::io(dir, e))?;

    let path = transcript_file(dir, session_id);
    fs::write(&path, content)
        .await
        .map_err(|e| TranscriptError::io(&path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote transcript");
    Ok(path)
}

/// Read a stored transcript back. `Ok(None)` if the session has none.
pub async fn read_transcript(dir: &Path, session_id: &str) -> Result<Option<String>, TranscriptError> {
    let path = transcript_file(dir, session_id);
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TranscriptError::io(path, e)),
    }
}

struct TranscriptFile {
    path: PathBuf,
    modified: SystemTime,
}

/// List transcript files in `dir`. A missing or unreadable directory is an
/// empty listing, not an error.
async fn list_transcripts(dir: &Path) -> Vec<TranscriptFile> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Transcript directory not readable, nothing to prune");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Stopped listing transcript directory");
                break;
            }
        };

        let path = entry.path();
        if path.extension().map(|e| e != TRANSCRIPT_EXTENSION).unwrap_or(true) {
            continue;
        }
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        // Unreadable stat sorts as oldest.
        let modified = fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .unwrap_or(UNIX_EPOCH);

        files.push(TranscriptFile { path, modified });
    }
    files
}

/// Delete one transcript. Returns whether the file was actually removed;
/// a file that is already gone is not an error.
async fn remove_transcript(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to prune transcript");
            false
        }
    }
}

/// Prune old transcript files.
///
/// Keeps the most recent files up to `max_count` and removes files older than
/// `max_age_days`. Returns the number of files that matched the removal
/// policy. Individual delete failures are logged and swallowed but still
/// counted.
pub async fn prune_transcripts(dir: &Path, opts: &PruneOptions) -> usize {
    let mut files = list_transcripts(dir).await;
    if files.is_empty() {
        return 0;
    }

    // Most recent first.
    files.sort_by(|a, b| b.modified.cmp(&a.modified));

    let max_age = Duration::from_secs(opts.max_age_days.saturating_mul(SECS_PER_DAY));
    let cutoff = SystemTime::now().checked_sub(max_age).unwrap_or(UNIX_EPOCH);

    let mut removed = 0;
    for (rank, file) in files.iter().enumerate() {
        let over_count = rank >= opts.max_count;
        let too_old = file.modified < cutoff;
        if !(over_count || too_old) {
            continue;
        }

        debug!(path = %file.path.display(), over_count, too_old, "Pruning transcript");
        remove_transcript(&file.path).await;
        removed += 1;
    }

    if removed > 0 {
        info!(dir = %dir.display(), removed, kept = files.len() - removed, "Pruned transcripts");
    }
    removed
}
