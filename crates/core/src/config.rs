//! TOML configuration.
//!
//! Loads from `<config dir>/compaction-recall/config.toml`. Every key is
//! optional; omitted keys fall back to the library defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::{default_config_path, default_transcript_dir};
use crate::retention::PruneOptions;
use crate::smart_tail::{SmartTailOptions, DEFAULT_MAX_TOKENS};
use crate::transcript::TranscriptOptions;

/// Tail settings as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailConfig {
    pub max_tokens: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Where transcripts are written; defaults to the app data dir.
    pub transcript_dir: Option<PathBuf>,
    pub transcript: TranscriptOptions,
    pub tail: TailConfig,
    pub prune: PruneOptions,
}

impl RecallConfig {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        Self::from_toml(path, &content)
    }

    fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse(path, e))
    }

    /// Configured transcript directory, else the platform default.
    pub fn resolved_transcript_dir(&self) -> Option<PathBuf> {
        self.transcript_dir
            .clone()
            .filter(|d| !d.as_os_str().is_empty())
            .or_else(default_transcript_dir)
    }

    /// Tail options pointing at `transcript_dir`.
    pub fn tail_options(&self, transcript_dir: Option<&Path>) -> SmartTailOptions {
        SmartTailOptions {
            transcript_dir: transcript_dir
                .filter(|d| !d.as_os_str().is_empty())
                .map(|d| d.to_string_lossy().into_owned()),
            max_tokens: self.tail.max_tokens,
        }
    }
}
