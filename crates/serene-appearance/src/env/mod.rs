//! Collaborator abstractions for testability.
//!
//! The reconciler talks to three external collaborators, each behind a
//! trait so that tests run without a real profile backend, a writable
//! data directory, or a desktop session:
//!
//! | Trait | Real | Mock |
//! |-------|------|------|
//! | [`ProfileStore`] | [`JsonProfileStore`] | [`MockProfileStore`] |
//! | [`LocalCache`] | [`FileCache`] | [`MockCache`] |
//! | [`PreferenceSignal`] | [`OsPreference`] | [`MockPreference`] |
//!
//! Mocks share their state between clones, so a test can keep one handle
//! for inspection while the reconciler owns another.

mod cache;
mod signal;
mod store;

pub use cache::{FileCache, LocalCache, MockCache, COLOR_MODE_KEY, THEME_KEY};
pub use signal::{MockPreference, OsPreference, PreferenceSignal, PreferenceWatch};
pub use store::{JsonProfileStore, MockProfileStore, ProfileAppearance, ProfilePatch, ProfileStore};

use std::sync::{Mutex, MutexGuard};

/// Locks a mock's shared state, recovering from a poisoned lock.
///
/// A panicking test thread must not cascade into unrelated assertions.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
