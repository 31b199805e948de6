// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when persisting or reading transcripts
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Permission denied accessing transcript path: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading the TOML configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl TranscriptError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the failed operation was touching.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied { path } | Self::Io { path, .. } => path,
        }
    }
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, err: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.message().to_string(),
        }
    }
}
