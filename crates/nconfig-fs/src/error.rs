//! Error types for nconfig-fs

use std::path::PathBuf;

/// Result type for nconfig-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nconfig-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} document at {path}: {message}")]
    Serialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Could not locate an nconfig.environments folder walking up from {start}")]
    RootNotFound { start: PathBuf },

    #[error("Bad .nconfig redirect at {path}: {message}")]
    Redirect { path: PathBuf, message: String },

    #[error("No environments document found in {root}")]
    DefinitionsNotFound { root: PathBuf },

    #[error("Environments document {path} has no \"default\" entry")]
    MissingDefault { path: PathBuf },

    #[error("No document found for environment {name} in {root}")]
    EnvironmentNotFound { name: String, root: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
