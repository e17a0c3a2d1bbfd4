//! OS dark-preference signal.
//!
//! A [`PreferenceSignal`] answers "is dark preferred right now" and hands out
//! [`PreferenceWatch`] guards that deliver change notifications. A watch is
//! a scoped resource: the subscription is released exactly once, when the
//! guard is dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::lock;
use crate::SignalError;

/// Source of the OS-level dark preference.
pub trait PreferenceSignal: Send {
    /// Whether the OS currently prefers a dark appearance.
    fn prefers_dark(&self) -> bool;

    /// Subscribes to preference changes.
    ///
    /// Each delivered value is the new dark preference. Dropping the returned
    /// guard unsubscribes.
    fn watch(&self) -> Result<PreferenceWatch, SignalError>;
}

type Release = Box<dyn FnOnce() + Send>;

/// An active subscription to preference changes.
pub struct PreferenceWatch {
    receiver: Receiver<bool>,
    release: Option<Release>,
}

impl PreferenceWatch {
    /// Wraps a notification channel and the action that unsubscribes it.
    pub fn new(receiver: Receiver<bool>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Takes every notification delivered since the last call, oldest first.
    ///
    /// Never blocks.
    pub fn drain(&self) -> Vec<bool> {
        self.receiver.try_iter().collect()
    }

    /// Blocks until the next notification or until `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Option<bool> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl fmt::Debug for PreferenceWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceWatch")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for PreferenceWatch {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

// === Real implementation ===

/// Reads the desktop appearance through the `dark-light` crate.
///
/// The OS offers no portable change notification, so a watch polls on a
/// background thread and only forwards actual changes.
#[derive(Debug, Clone, Copy)]
pub struct OsPreference {
    poll_interval: Duration,
}

impl OsPreference {
    /// Creates a signal polling once per second while watched.
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Sets how often a watch re-reads the OS preference.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for OsPreference {
    fn default() -> Self {
        Self::new()
    }
}

/// Unspecified and undetectable preferences read as light.
fn detect_os_dark() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => true,
        Ok(_) => false,
        Err(err) => {
            tracing::debug!(error = ?err, "OS color scheme detection failed, assuming light");
            false
        }
    }
}

impl PreferenceSignal for OsPreference {
    fn prefers_dark(&self) -> bool {
        detect_os_dark()
    }

    fn watch(&self) -> Result<PreferenceWatch, SignalError> {
        let (tx, rx) = mpsc::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let interval = self.poll_interval;

        thread::Builder::new()
            .name("serene-os-preference".to_string())
            .spawn(move || {
                let mut last = detect_os_dark();
                loop {
                    thread::sleep(interval);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    let now = detect_os_dark();
                    if now != last {
                        last = now;
                        if tx.send(now).is_err() {
                            break;
                        }
                    }
                }
            })
            .map_err(SignalError::Spawn)?;

        Ok(PreferenceWatch::new(rx, move || {
            stopped.store(true, Ordering::Release)
        }))
    }
}

// === Mock implementation for testing ===

#[derive(Debug, Default)]
struct MockPreferenceState {
    prefers_dark: bool,
    subscribers: BTreeMap<u64, Sender<bool>>,
    next_id: u64,
    total_watches: usize,
    fail_watch: bool,
}

/// A manually driven preference signal.
///
/// [`set_prefers_dark`](MockPreference::set_prefers_dark) notifies every
/// active watch when the value changes, the way an OS media query does.
#[derive(Debug, Clone, Default)]
pub struct MockPreference {
    state: Arc<Mutex<MockPreferenceState>>,
}

impl MockPreference {
    /// A signal that prefers light.
    pub fn light() -> Self {
        Self::default()
    }

    /// A signal that prefers dark.
    pub fn dark() -> Self {
        let signal = Self::default();
        lock(&signal.state).prefers_dark = true;
        signal
    }

    /// Changes the preference, notifying watchers if it differs.
    pub fn set_prefers_dark(&self, dark: bool) {
        let mut state = lock(&self.state);
        if state.prefers_dark == dark {
            return;
        }
        state.prefers_dark = dark;
        for tx in state.subscribers.values() {
            let _ = tx.send(dark);
        }
    }

    /// Makes subsequent watch requests fail (or succeed again).
    pub fn set_fail_watch(&self, fail: bool) {
        lock(&self.state).fail_watch = fail;
    }

    /// Number of watches currently held.
    pub fn active_watches(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Number of watches ever handed out.
    pub fn total_watches(&self) -> usize {
        lock(&self.state).total_watches
    }
}

impl PreferenceSignal for MockPreference {
    fn prefers_dark(&self) -> bool {
        lock(&self.state).prefers_dark
    }

    fn watch(&self) -> Result<PreferenceWatch, SignalError> {
        let mut state = lock(&self.state);
        if state.fail_watch {
            return Err(SignalError::Unsupported("simulated watch failure".to_string()));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.total_watches += 1;

        let (tx, rx) = mpsc::channel();
        state.subscribers.insert(id, tx);

        let shared = Arc::clone(&self.state);
        Ok(PreferenceWatch::new(rx, move || {
            lock(&shared).subscribers.remove(&id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_receives_changes_in_order() {
        let signal = MockPreference::light();
        let watch = signal.watch().unwrap();

        signal.set_prefers_dark(true);
        signal.set_prefers_dark(false);
        signal.set_prefers_dark(true);

        assert_eq!(watch.drain(), vec![true, false, true]);
        assert!(watch.drain().is_empty());
    }

    #[test]
    fn unchanged_preference_does_not_notify() {
        let signal = MockPreference::dark();
        let watch = signal.watch().unwrap();
        signal.set_prefers_dark(true);
        assert!(watch.drain().is_empty());
    }

    #[test]
    fn dropping_watch_unsubscribes_once() {
        let signal = MockPreference::light();
        let first = signal.watch().unwrap();
        let second = signal.watch().unwrap();
        assert_eq!(signal.active_watches(), 2);

        drop(first);
        assert_eq!(signal.active_watches(), 1);
        drop(second);
        assert_eq!(signal.active_watches(), 0);
        assert_eq!(signal.total_watches(), 2);
    }

    #[test]
    fn failed_watch_is_reported() {
        let signal = MockPreference::light();
        signal.set_fail_watch(true);
        assert!(matches!(signal.watch(), Err(SignalError::Unsupported(_))));
        assert_eq!(signal.active_watches(), 0);
    }

    #[test]
    fn wait_times_out_without_changes() {
        let signal = MockPreference::light();
        let watch = signal.watch().unwrap();
        assert_eq!(watch.wait(Duration::from_millis(10)), None);
        signal.set_prefers_dark(true);
        assert_eq!(watch.wait(Duration::from_millis(10)), Some(true));
    }

    #[test]
    fn watch_debug_shows_activity() {
        let watch = MockPreference::light().watch().unwrap();
        assert_eq!(format!("{:?}", watch), "PreferenceWatch { active: true }");
    }
}
