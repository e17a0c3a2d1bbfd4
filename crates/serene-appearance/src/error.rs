//! Error types for appearance reconciliation.

use std::io;

/// Errors raised at the string boundary of the reconciler.
///
/// The typed setters cannot fail; only raw values coming from users, files
/// or the wire are validated here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppearanceError {
    /// The value is not one of the wellness themes.
    #[error("unknown wellness theme '{0}' (expected one of: lavender, ocean, sunset, forest, moonlight)")]
    UnknownTheme(String),

    /// The value is not one of `light`, `dark` or `system`.
    #[error("unknown color mode '{0}' (expected one of: light, dark, system)")]
    UnknownColorMode(String),
}

/// Errors from the remote profile store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No profile row exists for the user.
    #[error("no profile record for user '{0}'")]
    NotFound(String),

    /// The backing document could not be read or written.
    #[error("profile store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The backing document is not valid profile JSON.
    #[error("profile store document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The store refused the operation (constraint violation, connectivity).
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Errors from the local key-value cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("local cache I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The cache file is not a JSON object of strings.
    #[error("local cache file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The cache rejected the write.
    #[error("local cache write rejected: {0}")]
    Rejected(String),
}

/// Errors from the OS preference signal.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// The background watcher thread could not be started.
    #[error("failed to start preference watcher: {0}")]
    Spawn(#[source] io::Error),

    /// The signal source does not support change notifications.
    #[error("preference change notifications are unavailable: {0}")]
    Unsupported(String),
}
