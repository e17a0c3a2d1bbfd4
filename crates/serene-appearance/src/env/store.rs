//! Remote profile store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lock;
use crate::{StoreError, UserId, WellnessTheme};

/// Column holding the theme identifier.
const THEME_COLUMN: &str = "wellness_theme";
/// Column holding the resolved dark flag.
const DARK_COLUMN: &str = "is_dark_mode";

/// The appearance columns of a profile row.
///
/// The theme is kept as a raw string: rows are shared with other writers
/// and may hold values this crate does not recognize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAppearance {
    /// The stored theme identifier.
    #[serde(default)]
    pub wellness_theme: Option<String>,
    /// The last resolved dark flag.
    #[serde(default)]
    pub is_dark_mode: Option<bool>,
}

impl ProfileAppearance {
    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(theme) = patch.wellness_theme {
            self.wellness_theme = Some(theme.as_str().to_string());
        }
        if let Some(dark) = patch.is_dark_mode {
            self.is_dark_mode = Some(dark);
        }
    }
}

/// A partial update of the appearance columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    /// New theme, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wellness_theme: Option<WellnessTheme>,
    /// New resolved dark flag, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dark_mode: Option<bool>,
}

impl ProfilePatch {
    /// A patch that only changes the theme.
    pub fn theme(theme: WellnessTheme) -> Self {
        Self {
            wellness_theme: Some(theme),
            is_dark_mode: None,
        }
    }

    /// A patch that only changes the dark flag.
    pub fn dark_mode(is_dark: bool) -> Self {
        Self {
            wellness_theme: None,
            is_dark_mode: Some(is_dark),
        }
    }
}

/// Durable per-user record store holding the profile row.
pub trait ProfileStore: Send + Sync {
    /// Reads the appearance columns of the user's row.
    ///
    /// Fails with [`StoreError::NotFound`] when the user has no row.
    fn fetch(&self, user: &UserId) -> Result<ProfileAppearance, StoreError>;

    /// Applies a partial update to the user's row.
    fn update(&self, user: &UserId, patch: &ProfilePatch) -> Result<(), StoreError>;
}

// === Real implementation ===

/// Profile rows kept in a JSON document keyed by user id.
///
/// Every call re-reads the document, so several processes sharing the file
/// see each other's writes. Columns other than the appearance columns are
/// preserved untouched on update.
///
/// ```json
/// {
///   "user-1": { "username": "sam", "wellness_theme": "ocean", "is_dark_mode": true }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    /// Creates a store backed by the document at `path`.
    ///
    /// The file is not touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty row for `user` unless one already exists.
    pub fn ensure_profile(&self, user: &UserId) -> Result<(), StoreError> {
        let mut doc = self.read_document()?;
        if doc.contains_key(user.as_str()) {
            return Ok(());
        }
        doc.insert(user.as_str().to_string(), Value::Object(Map::new()));
        self.write_document(&doc)
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn fetch(&self, user: &UserId) -> Result<ProfileAppearance, StoreError> {
        let doc = self.read_document()?;
        let row = doc
            .get(user.as_str())
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        Ok(ProfileAppearance::deserialize(row)?)
    }

    fn update(&self, user: &UserId, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut doc = self.read_document()?;
        let row = doc
            .get_mut(user.as_str())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;

        if let Some(theme) = patch.wellness_theme {
            row.insert(THEME_COLUMN.to_string(), Value::from(theme.as_str()));
        }
        if let Some(dark) = patch.is_dark_mode {
            row.insert(DARK_COLUMN.to_string(), Value::from(dark));
        }
        self.write_document(&doc)
    }
}

// === Mock implementation for testing ===

#[derive(Debug, Default)]
struct MockProfileState {
    rows: HashMap<UserId, ProfileAppearance>,
    fail_fetch: bool,
    fail_update: bool,
    fetches: usize,
    updates: Vec<(UserId, ProfilePatch)>,
}

/// In-memory profile store with failure injection.
///
/// Clones share rows, switches and the update log.
#[derive(Debug, Clone, Default)]
pub struct MockProfileStore {
    state: Arc<Mutex<MockProfileState>>,
}

impl MockProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row, returning the store for chaining.
    pub fn with_row(self, user: impl Into<String>, row: ProfileAppearance) -> Self {
        lock(&self.state).rows.insert(UserId::new(user), row);
        self
    }

    /// Makes every subsequent fetch fail (or succeed again).
    pub fn set_fail_fetch(&self, fail: bool) {
        lock(&self.state).fail_fetch = fail;
    }

    /// Makes every subsequent update fail (or succeed again).
    pub fn set_fail_update(&self, fail: bool) {
        lock(&self.state).fail_update = fail;
    }

    /// The current row for `user`.
    pub fn row(&self, user: &str) -> Option<ProfileAppearance> {
        lock(&self.state).rows.get(&UserId::new(user)).cloned()
    }

    /// Number of fetch calls so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        lock(&self.state).fetches
    }

    /// Every successful update, in call order.
    pub fn updates(&self) -> Vec<(UserId, ProfilePatch)> {
        lock(&self.state).updates.clone()
    }
}

impl ProfileStore for MockProfileStore {
    fn fetch(&self, user: &UserId) -> Result<ProfileAppearance, StoreError> {
        let mut state = lock(&self.state);
        state.fetches += 1;
        if state.fail_fetch {
            return Err(StoreError::unavailable("simulated fetch failure"));
        }
        state
            .rows
            .get(user)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user.to_string()))
    }

    fn update(&self, user: &UserId, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        if state.fail_update {
            return Err(StoreError::unavailable("simulated update failure"));
        }
        let row = state
            .rows
            .get_mut(user)
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        row.apply(patch);
        state.updates.push((user.clone(), *patch));
        Ok(())
    }
}
