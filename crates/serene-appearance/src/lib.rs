//! Wellness theme and light/dark mode reconciliation.
//!
//! `serene-appearance` owns the appearance of one user session: which
//! wellness theme is active, which color mode the user chose, and whether
//! the UI is currently dark. Those values have three possible sources and
//! two persisted copies:
//!
//! | | Theme | Mode |
//! |---|---|---|
//! | Remote profile row | `wellness_theme` | `is_dark_mode` (resolved flag only) |
//! | Local cache | `wellness_theme` | `color_mode` (keeps `system`) |
//! | OS preference | | resolves `system` |
//!
//! # Quick Start
//!
//! ```
//! use serene_appearance::env::{MockCache, MockPreference, MockProfileStore, ProfileAppearance};
//! use serene_appearance::{AppearanceReconciler, AppearanceSourceKind, ColorMode, Session, WellnessTheme};
//!
//! let store = MockProfileStore::new().with_row("u1", ProfileAppearance {
//!     wellness_theme: Some("ocean".into()),
//!     is_dark_mode: Some(true),
//! });
//! let mut appearance = AppearanceReconciler::new(store, MockCache::new(), MockPreference::light());
//!
//! let source = appearance.set_session(Some(Session::new("u1")));
//! assert_eq!(source, Some(AppearanceSourceKind::Remote));
//! assert_eq!(appearance.theme(), WellnessTheme::Ocean);
//! assert_eq!(appearance.color_mode(), ColorMode::Dark);
//!
//! let outcome = appearance.set_color_mode(ColorMode::System);
//! assert!(outcome.is_persisted());
//! assert!(!appearance.is_dark());
//! ```
//!
//! # Architecture
//!
//! - [`resolve_initial_state`] is the pure reconciliation function. It
//!   prefers the remote row when signed in and the local cache when signed
//!   out, with defaults behind either.
//! - [`AppearanceReconciler`] owns the state, runs reconciliation, applies
//!   mutations optimistically and reports persistence in a
//!   [`PersistOutcome`].
//! - [`env`] holds the collaborator traits with real and mock
//!   implementations.
//!
//! # Logging
//!
//! Transitions are logged at `debug` and swallowed persistence failures at
//! `warn` through [`tracing`]. Install a subscriber in the host to see them.

pub mod env;
mod error;
mod mode;
mod outcome;
mod reconciler;
mod resolve;
mod state;
mod theme;

pub use error::{AppearanceError, CacheError, SignalError, StoreError};
pub use mode::ColorMode;
pub use outcome::{PersistOutcome, RemoteWrite};
pub use reconciler::{AppearanceReconciler, Presenter};
pub use resolve::{
    resolve_initial_state, AppearanceSourceKind, CachedAppearance, ResolvedAppearance, Session,
    UserId,
};
pub use state::AppearanceState;
pub use theme::{catalog, Rgb, ThemeInfo, WellnessTheme};
