//! Error types for nconfig-core

/// Result type for nconfig-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which document category failed a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Settings,
    ConnectionStrings,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settings => write!(f, "settings"),
            Self::ConnectionStrings => write!(f, "connection strings"),
        }
    }
}

/// Errors that can occur in nconfig-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resolved environment's key set does not match the default's.
    #[error("Environment {environment} has missing or extra {category} compared to the default")]
    InconsistentEnvironment {
        environment: String,
        category: Category,
    },

    /// Bounded-wait lock acquisition timed out.
    #[error("Timed out acquiring state lock for {operation}")]
    LockTimeout { operation: &'static str },

    /// Write-back to the active configuration store failed.
    #[error("Failed to persist active configuration")]
    Persist {
        #[source]
        source: nconfig_fs::Error,
    },

    /// File-watcher error from notify
    #[error(transparent)]
    Watch(#[from] notify::Error),

    /// Filesystem error from nconfig-fs
    #[error(transparent)]
    Fs(#[from] nconfig_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
