//! Error types for agentmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

use agentmirror_core::ConfigError;

/// All errors that can arise from sync operations.
///
/// Only [`SyncError::BaseFileMissing`] and [`SyncError::CorruptManifest`] abort a
/// whole run; I/O errors on a single item are reported on that item instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from configuration loading.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source root has no base file; nothing can be distributed.
    #[error("base file not found: {path}")]
    BaseFileMissing { path: PathBuf },

    /// The manifest file exists but cannot be parsed. Never discarded silently.
    #[error("manifest at {path} is corrupt: {source}")]
    CorruptManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (manifest save).
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
