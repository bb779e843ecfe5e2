//! Error types for agentmirror-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed but describes an unusable setup.
    #[error("invalid config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.agentmirror/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
