//! The appearance reconciler.
//!
//! [`AppearanceReconciler`] owns the in-memory [`AppearanceState`] for one
//! session and is the only writer of it. Consumers read through the
//! accessors and mutate through [`set_theme`](AppearanceReconciler::set_theme),
//! [`set_color_mode`](AppearanceReconciler::set_color_mode) and
//! [`toggle_color_mode`](AppearanceReconciler::toggle_color_mode).
//!
//! # Sources and sinks
//!
//! ```text
//!              ┌──────────── fetch (session only) ───── ProfileStore
//! initialize ──┼──────────── get (no session only) ──── LocalCache
//!              └──────────── prefers_dark ────────────── PreferenceSignal
//!
//! set_theme      ─▶ cache "wellness_theme", profile wellness_theme
//! set_color_mode ─▶ cache "color_mode",     profile is_dark_mode (resolved)
//! ```
//!
//! # OS subscription
//!
//! While the mode is [`ColorMode::System`] the reconciler holds exactly one
//! [`PreferenceWatch`]. It is acquired on entering `system`, released on
//! leaving it, and released when the reconciler is dropped. Notifications
//! are applied by [`poll_preference`](AppearanceReconciler::poll_preference)
//! or [`wait_preference`](AppearanceReconciler::wait_preference) on the
//! owning thread.
//!
//! # Example
//!
//! ```
//! use serene_appearance::env::{MockCache, MockPreference, MockProfileStore};
//! use serene_appearance::{AppearanceReconciler, ColorMode, WellnessTheme};
//!
//! let mut appearance = AppearanceReconciler::new(
//!     MockProfileStore::new(),
//!     MockCache::new(),
//!     MockPreference::dark(),
//! );
//! appearance.initialize();
//! assert!(appearance.is_dark());
//!
//! appearance.set_theme(WellnessTheme::Ocean);
//! appearance.toggle_color_mode();
//! assert_eq!(appearance.color_mode(), ColorMode::Light);
//! ```

use std::time::Duration;

use tracing::{debug, warn};

use crate::env::{
    LocalCache, PreferenceSignal, PreferenceWatch, ProfilePatch, ProfileStore, COLOR_MODE_KEY,
    THEME_KEY,
};
use crate::{
    resolve_initial_state, AppearanceError, AppearanceSourceKind, AppearanceState,
    CachedAppearance, CacheError, ColorMode, PersistOutcome, RemoteWrite, Session, WellnessTheme,
};

/// Receives every effective appearance change.
///
/// This is where a host restyles its views: switching the dark class,
/// swapping the theme palette, and so on.
pub trait Presenter {
    /// Applies the given state to the presentation layer.
    fn present(&mut self, state: &AppearanceState);
}

impl<F> Presenter for F
where
    F: FnMut(&AppearanceState),
{
    fn present(&mut self, state: &AppearanceState) {
        self(state)
    }
}

/// Owns and synchronizes the appearance state of one session.
pub struct AppearanceReconciler<S, C, P> {
    store: S,
    cache: C,
    signal: P,
    session: Option<Session>,
    state: AppearanceState,
    watch: Option<PreferenceWatch>,
    presenter: Option<Box<dyn Presenter>>,
}

impl<S, C, P> AppearanceReconciler<S, C, P>
where
    S: ProfileStore,
    C: LocalCache,
    P: PreferenceSignal,
{
    /// Creates a reconciler holding default state and no session.
    ///
    /// Nothing is read until [`initialize`](Self::initialize) or
    /// [`set_session`](Self::set_session) runs.
    pub fn new(store: S, cache: C, signal: P) -> Self {
        Self {
            store,
            cache,
            signal,
            session: None,
            state: AppearanceState::default(),
            watch: None,
            presenter: None,
        }
    }

    /// Attaches the presenter notified of every change.
    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    /// Sets the initial session without running initialization.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// The current state.
    pub fn state(&self) -> &AppearanceState {
        &self.state
    }

    /// The active theme.
    pub fn theme(&self) -> WellnessTheme {
        self.state.theme
    }

    /// The chosen color mode.
    pub fn color_mode(&self) -> ColorMode {
        self.state.color_mode
    }

    /// The resolved dark flag.
    pub fn is_dark(&self) -> bool {
        self.state.is_dark
    }

    /// The current session, if signed in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether an OS preference subscription is held.
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// The profile store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The local cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The preference signal.
    pub fn signal(&self) -> &P {
        &self.signal
    }

    /// Reconciles state from the profile row, local cache and OS preference.
    ///
    /// With a session, a failed profile read is logged and defaults apply;
    /// the local cache is only consulted when signed out. Returns the source
    /// that supplied the state.
    pub fn initialize(&mut self) -> AppearanceSourceKind {
        let remote = self.session.as_ref().and_then(|session| {
            match self.store.fetch(&session.user) {
                Ok(row) => Some(row),
                Err(err) => {
                    warn!(user = %session.user, error = %err, "could not load profile appearance");
                    None
                }
            }
        });
        let local = CachedAppearance::read(&self.cache);
        let os_prefers_dark = self.signal.prefers_dark();

        let resolved =
            resolve_initial_state(self.session.as_ref(), remote.as_ref(), &local, os_prefers_dark);
        debug!(
            source = %resolved.source,
            theme = %resolved.state.theme,
            mode = %resolved.state.color_mode,
            is_dark = resolved.state.is_dark,
            "appearance initialized"
        );

        self.state = resolved.state;
        self.sync_watch();
        self.present();
        resolved.source
    }

    /// Switches the session, re-running initialization when the identity
    /// changes.
    ///
    /// Returns the source of the new state, or `None` when the session is
    /// unchanged.
    pub fn set_session(&mut self, session: Option<Session>) -> Option<AppearanceSourceKind> {
        if self.session == session {
            return None;
        }
        debug!(
            from = ?self.session.as_ref().map(|s| s.user.as_str()),
            to = ?session.as_ref().map(|s| s.user.as_str()),
            "session changed"
        );
        self.session = session;
        Some(self.initialize())
    }

    /// Applies a theme, then persists it to the cache and, with a session,
    /// the profile row.
    ///
    /// In `system` mode without a live OS watch the dark flag is re-read, so
    /// a failed subscription does not leave it stale.
    pub fn set_theme(&mut self, theme: WellnessTheme) -> PersistOutcome {
        self.state.theme = theme;
        if self.state.color_mode.follows_os() && !self.is_watching() {
            self.state.is_dark = self.state.color_mode.resolve(self.signal.prefers_dark());
        }
        self.present();

        let local = self.write_local(THEME_KEY, theme.as_str());
        let remote = self.write_remote(ProfilePatch::theme(theme));
        PersistOutcome { local, remote }
    }

    /// Parses and applies a theme.
    ///
    /// # Errors
    ///
    /// Returns [`AppearanceError::UnknownTheme`] and leaves state untouched
    /// when `raw` is not a theme.
    pub fn set_theme_str(&mut self, raw: &str) -> Result<PersistOutcome, AppearanceError> {
        let theme = raw.parse()?;
        Ok(self.set_theme(theme))
    }

    /// Applies a color mode, then persists it.
    ///
    /// The cache keeps the three-way mode; the profile row only receives the
    /// resolved dark flag.
    pub fn set_color_mode(&mut self, mode: ColorMode) -> PersistOutcome {
        self.state.color_mode = mode;
        // Subscribe before reading so a change in between is not lost.
        self.sync_watch();
        let os_prefers_dark = mode.follows_os() && self.signal.prefers_dark();
        self.state.is_dark = mode.resolve(os_prefers_dark);
        self.present();

        let local = self.write_local(COLOR_MODE_KEY, mode.as_str());
        let remote = self.write_remote(ProfilePatch::dark_mode(self.state.is_dark));
        PersistOutcome { local, remote }
    }

    /// Parses and applies a color mode.
    ///
    /// # Errors
    ///
    /// Returns [`AppearanceError::UnknownColorMode`] and leaves state
    /// untouched when `raw` is not a mode.
    pub fn set_color_mode_str(&mut self, raw: &str) -> Result<PersistOutcome, AppearanceError> {
        let mode = raw.parse()?;
        Ok(self.set_color_mode(mode))
    }

    /// Switches to the explicit mode opposite the current resolved scheme.
    ///
    /// From `system` resolving dark this selects `light`; it never selects
    /// `system`.
    pub fn toggle_color_mode(&mut self) -> PersistOutcome {
        self.set_color_mode(ColorMode::explicit(!self.state.is_dark))
    }

    /// Applies pending OS preference notifications.
    ///
    /// Each notification re-resolves the dark flag and re-presents. Returns
    /// the number applied; always zero outside `system` mode.
    pub fn poll_preference(&mut self) -> usize {
        let events = match &self.watch {
            Some(watch) => watch.drain(),
            None => return 0,
        };
        for &dark in &events {
            self.apply_os_preference(dark);
        }
        events.len()
    }

    /// Blocks up to `timeout` for an OS preference notification and applies
    /// it along with any others already queued.
    ///
    /// Returns `false` on timeout or when no subscription is held.
    pub fn wait_preference(&mut self, timeout: Duration) -> bool {
        let first = match &self.watch {
            Some(watch) => watch.wait(timeout),
            None => return false,
        };
        match first {
            Some(dark) => {
                self.apply_os_preference(dark);
                self.poll_preference();
                true
            }
            None => false,
        }
    }

    fn apply_os_preference(&mut self, dark: bool) {
        if !self.state.color_mode.follows_os() {
            return;
        }
        debug!(is_dark = dark, "OS preference changed");
        self.state.is_dark = dark;
        self.present();
    }

    /// Acquires or releases the OS watch to match the current mode.
    fn sync_watch(&mut self) {
        match (self.state.color_mode.follows_os(), self.watch.is_some()) {
            (true, false) => match self.signal.watch() {
                Ok(watch) => {
                    debug!("subscribed to OS preference changes");
                    self.watch = Some(watch);
                }
                Err(err) => {
                    warn!(error = %err, "could not subscribe to OS preference changes");
                }
            },
            (false, true) => {
                self.watch = None;
                debug!("unsubscribed from OS preference changes");
            }
            _ => {}
        }
    }

    fn present(&mut self) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.present(&self.state);
        }
    }

    fn write_local(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let result = self.cache.set(key, value);
        if let Err(err) = &result {
            warn!(key, value, error = %err, "local appearance cache write failed");
        }
        result
    }

    fn write_remote(&self, patch: ProfilePatch) -> RemoteWrite {
        let Some(session) = &self.session else {
            return RemoteWrite::Skipped;
        };
        match self.store.update(&session.user, &patch) {
            Ok(()) => RemoteWrite::Written,
            Err(err) => {
                warn!(user = %session.user, error = %err, "profile appearance write failed");
                RemoteWrite::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::env::{MockCache, MockPreference, MockProfileStore, ProfileAppearance};

    type MockReconciler = AppearanceReconciler<MockProfileStore, MockCache, MockPreference>;

    fn reconciler(signal: &MockPreference) -> MockReconciler {
        AppearanceReconciler::new(MockProfileStore::new(), MockCache::new(), signal.clone())
    }

    #[test]
    fn new_does_not_touch_collaborators() {
        let signal = MockPreference::dark();
        let store = MockProfileStore::new();
        let appearance =
            AppearanceReconciler::new(store.clone(), MockCache::new(), signal.clone())
                .with_session(Session::new("u1"));
        assert_eq!(*appearance.state(), AppearanceState::default());
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(signal.active_watches(), 0);
    }

    #[test]
    fn initialize_in_system_mode_subscribes() {
        let signal = MockPreference::dark();
        let mut appearance = reconciler(&signal);
        assert_eq!(appearance.initialize(), AppearanceSourceKind::Default);
        assert!(appearance.is_dark());
        assert!(appearance.is_watching());
        assert_eq!(signal.active_watches(), 1);
    }

    #[test]
    fn repeated_system_mode_keeps_single_watch() {
        let signal = MockPreference::light();
        let mut appearance = reconciler(&signal);
        appearance.initialize();
        appearance.set_color_mode(ColorMode::System);
        appearance.set_color_mode(ColorMode::System);
        assert_eq!(signal.active_watches(), 1);
        assert_eq!(signal.total_watches(), 1);
    }

    #[test]
    fn presenter_sees_every_change() {
        let signal = MockPreference::light();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut appearance = reconciler(&signal)
            .with_presenter(move |state: &AppearanceState| sink.borrow_mut().push(*state));

        appearance.initialize();
        appearance.set_theme(WellnessTheme::Sunset);
        signal.set_prefers_dark(true);
        assert_eq!(appearance.poll_preference(), 1);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(!seen[1].is_dark);
        assert_eq!(seen[2].theme, WellnessTheme::Sunset);
        assert!(seen[2].is_dark);
    }

    #[test]
    fn watch_failure_still_resolves_from_os() {
        let signal = MockPreference::dark();
        signal.set_fail_watch(true);
        let mut appearance = reconciler(&signal);
        appearance.initialize();
        assert!(appearance.is_dark());
        assert!(!appearance.is_watching());

        signal.set_fail_watch(false);
        appearance.set_color_mode(ColorMode::System);
        assert!(appearance.is_watching());
    }

    #[test]
    fn set_theme_rereads_os_when_unwatched_in_system_mode() {
        let signal = MockPreference::light();
        signal.set_fail_watch(true);
        let mut appearance = reconciler(&signal);
        appearance.initialize();
        assert!(!appearance.is_dark());

        signal.set_prefers_dark(true);
        appearance.set_theme(WellnessTheme::Ocean);
        assert_eq!(appearance.theme(), WellnessTheme::Ocean);
        assert_eq!(appearance.color_mode(), ColorMode::System);
        assert!(appearance.is_dark());
    }

    #[test]
    fn set_theme_keeps_explicit_mode_flag() {
        let signal = MockPreference::light();
        let mut appearance = reconciler(&signal);
        appearance.set_color_mode(ColorMode::Dark);
        appearance.set_theme(WellnessTheme::Forest);
        assert!(appearance.is_dark());
    }

    #[test]
    fn set_session_reinitializes_only_on_change() {
        let signal = MockPreference::light();
        let store = MockProfileStore::new().with_row(
            "u1",
            ProfileAppearance {
                wellness_theme: Some("forest".into()),
                is_dark_mode: Some(true),
            },
        );
        let mut appearance =
            AppearanceReconciler::new(store.clone(), MockCache::new(), signal.clone());

        assert_eq!(
            appearance.set_session(Some(Session::new("u1"))),
            Some(AppearanceSourceKind::Remote)
        );
        assert_eq!(appearance.theme(), WellnessTheme::Forest);
        assert!(!appearance.is_watching());

        assert_eq!(appearance.set_session(Some(Session::new("u1"))), None);
        assert_eq!(store.fetch_count(), 1);

        assert_eq!(appearance.set_session(None), Some(AppearanceSourceKind::Default));
        assert_eq!(appearance.theme(), WellnessTheme::Lavender);
        assert!(appearance.is_watching());
    }

    #[test]
    fn wait_preference_without_watch_returns_immediately() {
        let signal = MockPreference::light();
        let mut appearance = reconciler(&signal);
        appearance.set_color_mode(ColorMode::Dark);
        assert!(!appearance.wait_preference(Duration::from_secs(5)));
    }

    #[test]
    fn wait_preference_applies_queued_changes() {
        let signal = MockPreference::light();
        let mut appearance = reconciler(&signal);
        appearance.initialize();

        signal.set_prefers_dark(true);
        signal.set_prefers_dark(false);
        signal.set_prefers_dark(true);
        assert!(appearance.wait_preference(Duration::from_millis(10)));
        assert!(appearance.is_dark());
        assert_eq!(appearance.poll_preference(), 0);
    }
}
