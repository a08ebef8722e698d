//! Settings persistence.
//!
//! The save pipeline treats storage as a plain key-value collaborator.
//! Implement [`SettingsStore`] to back it with a database, an options
//! table, or anything else that can hold one serialized bag per key.
//!
//! `set` returns `false` both when the write fails and when the incoming
//! value equals what is already stored. The caller disambiguates by
//! reading back — an unchanged write is acknowledged as a no-op success,
//! not an error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::Settings;

/// A key-value store for settings bags.
pub trait SettingsStore: Send {
    /// Fetch the bag stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Settings>;

    /// Store `value` under `key`. Returns `true` only when a changed
    /// value was durably written.
    fn set(&mut self, key: &str, value: &Settings) -> bool;
}

/// In-memory store. The reference implementation, also used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Settings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Settings> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &Settings) -> bool {
        if self.entries.get(key) == Some(value) {
            return false;
        }
        self.entries.insert(key.to_string(), value.clone());
        true
    }
}

/// File-backed store: one JSON document holding the whole key-to-bag map.
///
/// Reads tolerate a missing or malformed file (treated as empty). Write
/// errors surface as `set` returning `false`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use (or create on first write) the JSON document at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> HashMap<String, Settings> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Settings> {
        self.load().remove(key)
    }

    fn set(&mut self, key: &str, value: &Settings) -> bool {
        let mut entries = self.load();
        if entries.get(key) == Some(value) {
            return false;
        }
        entries.insert(key.to_string(), value.clone());

        let serialized = match serde_json::to_string_pretty(&entries) {
            Ok(json) => json,
            Err(_) => return false,
        };
        fs::write(&self.path, serialized).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_reports_unchanged() {
        let mut store = MemoryStore::new();
        let bag = Settings::default();

        assert!(store.set("settings", &bag));
        // Identical value: no-op, reported as false.
        assert!(!store.set("settings", &bag));

        let mut changed = bag.clone();
        changed.enable_feature = true;
        assert!(store.set("settings", &changed));
        assert_eq!(store.get("settings"), Some(changed));
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent"), None);
    }
}
