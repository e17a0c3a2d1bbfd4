//! Persistence outcomes returned by the mutators.
//!
//! Mutations are optimistic: in-memory state changes first and is never
//! rolled back. The outcome tells the caller which copies were written, so
//! it can surface a non-blocking notice. Ignoring it is allowed; failures
//! are also logged.

use crate::{CacheError, StoreError};

/// What happened to the remote profile write.
#[derive(Debug)]
pub enum RemoteWrite {
    /// No session, so nothing was sent.
    Skipped,
    /// The profile row was updated.
    Written,
    /// The store rejected the update.
    Failed(StoreError),
}

impl RemoteWrite {
    /// Whether the write was attempted and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of persisting one mutation to both copies.
#[derive(Debug)]
pub struct PersistOutcome {
    /// The local cache write.
    pub local: Result<(), CacheError>,
    /// The remote profile write.
    pub remote: RemoteWrite,
}

impl PersistOutcome {
    /// True when no write failed. A skipped remote write counts as success.
    pub fn is_persisted(&self) -> bool {
        self.local.is_ok() && !self.remote.is_failed()
    }

    /// Human-readable descriptions of every failed write.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if let Err(err) = &self.local {
            failures.push(err.to_string());
        }
        if let RemoteWrite::Failed(err) = &self.remote {
            failures.push(err.to_string());
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_remote_is_persisted() {
        let outcome = PersistOutcome {
            local: Ok(()),
            remote: RemoteWrite::Skipped,
        };
        assert!(outcome.is_persisted());
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn failures_are_collected_from_both_sinks() {
        let outcome = PersistOutcome {
            local: Err(CacheError::Rejected("full".into())),
            remote: RemoteWrite::Failed(StoreError::unavailable("offline")),
        };
        assert!(!outcome.is_persisted());
        let failures = outcome.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("full"));
        assert!(failures[1].contains("offline"));
    }
}
