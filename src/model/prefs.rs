//! Key-value preference storage shared across sessions.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::collections::HashMap;

pub const CLOSE_ON_APPLY_KEY: &str = "closeOnApply";
pub const TARGET_WINDOW_KEY: &str = "targetWindowId";
pub const COUNTER_KEY: &str = "orpc:counter";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access preference file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference file {path} is not a JSON object")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError>;
    fn set(&self, key: &str, value: Value) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;

    /// Reads a boolean, treating read failures and other types as absent.
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Ok(value) => value.and_then(|v| v.as_bool()),
            Err(err) => {
                warn!(?err, key, "failed to read preference");
                None
            }
        }
    }

    /// Reads an integer, treating read failures and other types as absent.
    fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Ok(value) => value.and_then(|v| v.as_i64()),
            Err(err) => {
                warn!(?err, key, "failed to read preference");
                None
            }
        }
    }
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for &P {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> { (**self).get(key) }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> { (**self).set(key, value) }

    fn remove(&self, key: &str) -> Result<(), PersistError> { (**self).remove(key) }
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<P> {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> { (**self).get(key) }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> { (**self).set(key, value) }

    fn remove(&self, key: &str) -> Result<(), PersistError> { (**self).remove(key) }
}

#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<HashMap<String, Value>>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        Ok(self.0.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> {
        self.0.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.0.lock().remove(key);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten on every change.
///
/// A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), lock: Mutex::new(()) } }

    /// `<data dir>/window-resizer/prefs.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("window-resizer").join("prefs.json"))
    }

    pub fn path(&self) -> &Path { &self.path }

    fn io_err(&self, source: std::io::Error) -> PersistError {
        PersistError::Io { path: self.path.clone(), source }
    }

    fn read(&self) -> Result<Map<String, Value>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(self.io_err(err)),
        };
        serde_json::from_str(&text).map_err(|source| PersistError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, map: &Map<String, Value>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let text = serde_json::to_string_pretty(map).map_err(|source| PersistError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), keys = map.len(), "wrote preferences");
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        let _guard = self.lock.lock();
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistError> {
        let _guard = self.lock.lock();
        let mut map = self.read()?;
        map.insert(key.to_string(), value);
        self.write(&map)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let _guard = self.lock.lock();
        let mut map = self.read()?;
        if map.remove(key).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn typed_reads_ignore_other_types() {
        let store = MemoryStore::new();
        store.set(CLOSE_ON_APPLY_KEY, json!("yes")).unwrap();
        store.set(COUNTER_KEY, json!(1.5)).unwrap();
        assert_eq!(store.get_bool(CLOSE_ON_APPLY_KEY), None);
        assert_eq!(store.get_i64(COUNTER_KEY), None);

        store.set(CLOSE_ON_APPLY_KEY, json!(false)).unwrap();
        store.set(COUNTER_KEY, json!(3)).unwrap();
        assert_eq!(store.get_bool(CLOSE_ON_APPLY_KEY), Some(false));
        assert_eq!(store.get_i64(COUNTER_KEY), Some(3));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let store = JsonFileStore::new(&path);
        assert_eq!(store.get(TARGET_WINDOW_KEY).unwrap(), None);

        store.set(TARGET_WINDOW_KEY, json!(12)).unwrap();
        store.set(CLOSE_ON_APPLY_KEY, json!(true)).unwrap();
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get_i64(TARGET_WINDOW_KEY), Some(12));

        reopened.remove(TARGET_WINDOW_KEY).unwrap();
        assert_eq!(store.get(TARGET_WINDOW_KEY).unwrap(), None);
        assert_eq!(store.get_bool(CLOSE_ON_APPLY_KEY), Some(true));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2]").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get(COUNTER_KEY), Err(PersistError::Malformed { .. })));
        assert_eq!(store.get_i64(COUNTER_KEY), None);
    }
}
