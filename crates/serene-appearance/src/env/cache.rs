//! Device-local key-value cache.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::CacheError;

/// Cache slot holding the theme identifier.
pub const THEME_KEY: &str = "wellness_theme";
/// Cache slot holding the three-way color mode.
pub const COLOR_MODE_KEY: &str = "color_mode";

/// Durable string slots scoped to the device.
///
/// Writes are synchronous. There is no expiry.
pub trait LocalCache: Send {
    /// Returns the slot's value, or `None` when it was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value and persists it before returning.
    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

// === Real implementation ===

/// A cache persisted as a flat JSON object.
///
/// Entries are loaded once on [`open`](FileCache::open) and the whole file is
/// rewritten on every [`set`](LocalCache::set).
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileCache {
    /// Opens the cache at `path`. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the file exists but cannot be read or is
    /// not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

// === Mock implementation for testing ===

#[derive(Debug, Default)]
struct MockCacheState {
    entries: HashMap<String, String>,
    fail_writes: bool,
    writes: usize,
}

/// In-memory cache with write failure injection.
///
/// Clones share entries. A failed write leaves the entry unchanged.
#[derive(Debug, Clone, Default)]
pub struct MockCache {
    state: Arc<Mutex<MockCacheState>>,
}

impl MockCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the cache for chaining.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        lock(&self.state).entries.insert(key.into(), value.into());
        self
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }
}

impl LocalCache for MockCache {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.state).entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut state = lock(&self.state);
        if state.fail_writes {
            return Err(CacheError::Rejected("simulated write failure".to_string()));
        }
        state.entries.insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }
}
