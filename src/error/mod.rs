//! Error handling for the prevalence curator.
//!
//! Only boundary failures (corpus load, result persistence, configuration)
//! surface as errors. Problems with a single record are logged and skipped
//! by the curation pipeline instead.

use std::io;
use std::path::{Path, PathBuf};

/// Specialized error type for curation runs
#[derive(Debug, thiserror::Error)]
pub enum CurationError {
    /// Error opening, reading or writing a file
    #[error("IO error for {}: {source}", path.display())]
    Io {
        /// File the operation was performed on
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Error decoding or encoding JSON
    #[error("JSON error for {}: {source}", path.display())]
    Parse {
        /// File the operation was performed on
        path: PathBuf,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The corpus was readable but structurally unusable
    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    /// Configuration values are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CurationError {
    /// Wrap an IO error with the path it occurred on
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a serde error with the path it occurred on
    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for curation operations
pub type Result<T> = std::result::Result<T, CurationError>;
