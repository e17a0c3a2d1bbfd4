//! Command execution.
//!
//! The host wires file-backed collaborators into a reconciler: the profile
//! document under the data directory stands in for the remote store, and
//! `cache.json` is the device-local cache. The preference signal is
//! injected so commands can run against a mock in tests.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use serene_appearance::env::{FileCache, JsonProfileStore, PreferenceSignal};
use serene_appearance::{
    catalog, AppearanceReconciler, AppearanceSourceKind, AppearanceState, PersistOutcome, Session,
    ThemeInfo,
};

use crate::cli::Command;
use crate::config::Settings;
use crate::render;

type Reconciler<P> = AppearanceReconciler<JsonProfileStore, FileCache, P>;

/// Longest single wait while following OS changes.
const WATCH_TICK: Duration = Duration::from_millis(250);

/// Where output goes.
pub struct Output<'a> {
    /// Results.
    pub out: &'a mut dyn Write,
    /// Notices and warnings.
    pub err: &'a mut dyn Write,
    /// Emit JSON instead of styled text.
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    state: AppearanceState,
    source: AppearanceSourceKind,
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<String>,
}

#[derive(Serialize)]
struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    gradient: [String; 2],
    active: bool,
}

/// Runs one command to completion.
pub fn run<P: PreferenceSignal>(
    command: &Command,
    settings: &Settings,
    signal: P,
    output: &mut Output<'_>,
) -> Result<()> {
    let changes: Rc<RefCell<Vec<AppearanceState>>> = Rc::default();
    let sink = Rc::clone(&changes);
    let mut appearance = open(settings, signal)?
        .with_presenter(move |state: &AppearanceState| sink.borrow_mut().push(*state));

    let source = start(&mut appearance, settings);
    changes.borrow_mut().clear();

    let user = settings.user.as_deref();
    match command {
        Command::Show => report(output, appearance.state(), source, user, None),
        Command::Themes => themes(output, appearance.state()),
        Command::SetTheme { theme } => {
            let outcome = appearance.set_theme_str(theme)?;
            report(output, appearance.state(), source, user, Some(&outcome))
        }
        Command::Mode { mode } => {
            let outcome = appearance.set_color_mode_str(mode)?;
            report(output, appearance.state(), source, user, Some(&outcome))
        }
        Command::Toggle => {
            let outcome = appearance.toggle_color_mode();
            report(output, appearance.state(), source, user, Some(&outcome))
        }
        Command::Watch { seconds } => {
            watch(&mut appearance, &changes, seconds.map(Duration::from_secs), output)
        }
    }
}

fn open<P: PreferenceSignal>(settings: &Settings, signal: P) -> Result<Reconciler<P>> {
    let store = JsonProfileStore::new(settings.profiles_path());
    let cache_path = settings.cache_path();
    let cache = FileCache::open(&cache_path)
        .with_context(|| format!("failed to open local cache {}", cache_path.display()))?;
    Ok(AppearanceReconciler::new(store, cache, signal))
}

/// Signs in when a user is configured, otherwise initializes signed out.
fn start<P: PreferenceSignal>(
    appearance: &mut Reconciler<P>,
    settings: &Settings,
) -> AppearanceSourceKind {
    let Some(user) = &settings.user else {
        return appearance.initialize();
    };
    let session = Session::new(user.clone());
    if let Err(err) = appearance.store().ensure_profile(&session.user) {
        tracing::warn!(user = %session.user, error = %err, "could not create profile row");
    }
    match appearance.set_session(Some(session)) {
        Some(source) => source,
        None => appearance.initialize(),
    }
}

fn report(
    output: &mut Output<'_>,
    state: &AppearanceState,
    source: AppearanceSourceKind,
    user: Option<&str>,
    outcome: Option<&PersistOutcome>,
) -> Result<()> {
    if output.json {
        let report = Report {
            state: *state,
            source,
            user,
            saved: outcome.map(PersistOutcome::is_persisted),
            failures: outcome.map(PersistOutcome::failures).unwrap_or_default(),
        };
        writeln!(output.out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    match outcome {
        None => write!(output.out, "{}", render::render_state(state, source, user))?,
        Some(outcome) => {
            writeln!(output.out, "{}", render::render_line(state))?;
            if let Some(notice) = render::render_failures(outcome) {
                write!(output.err, "{}", notice)?;
            }
        }
    }
    Ok(())
}

fn themes(output: &mut Output<'_>, state: &AppearanceState) -> Result<()> {
    if output.json {
        let entries: Vec<CatalogEntry> = catalog()
            .iter()
            .map(|info| CatalogEntry {
                id: info.theme.as_str(),
                name: info.name,
                description: info.description,
                icon: info.icon,
                gradient: [
                    ThemeInfo::hex(info.gradient_from),
                    ThemeInfo::hex(info.gradient_to),
                ],
                active: info.theme == state.theme,
            })
            .collect();
        writeln!(output.out, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(output.out, "{}", render::render_catalog(state.theme))?;
    }
    Ok(())
}

fn watch<P: PreferenceSignal>(
    appearance: &mut Reconciler<P>,
    changes: &RefCell<Vec<AppearanceState>>,
    limit: Option<Duration>,
    output: &mut Output<'_>,
) -> Result<()> {
    writeln!(output.out, "{}", render::render_line(appearance.state()))?;
    if !appearance.is_watching() {
        writeln!(
            output.err,
            "color mode is {}; OS appearance changes are ignored",
            appearance.color_mode()
        )?;
        return Ok(());
    }

    let deadline = limit.map(|limit| Instant::now() + limit);
    loop {
        let wait = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                (deadline - now).min(WATCH_TICK)
            }
            None => WATCH_TICK,
        };
        if appearance.wait_preference(wait) {
            for state in changes.borrow_mut().drain(..) {
                writeln!(output.out, "{}", render::render_line(&state))?;
            }
            output.out.flush()?;
        }
    }
    Ok(())
}
