use hotfinder_core::preferences::PreferenceStore;
use hotfinder_core::{HotFinderError, Result};
use log::{info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Preferences kept as one JSON object on disk, rewritten on every change.
///
/// Writes go to a sibling temp file renamed over the real one, and the in-memory copy
/// only changes once that rename succeeded.
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFilePreferenceStore {
    /// A missing file starts empty. A file that is not a JSON object is moved aside to
    /// `<path>.corrupt` and the store starts empty. Any other read error fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => {
                    info!("Loaded {} preference keys from {}", values.len(), path.display());
                    values
                }
                Err(e) => {
                    let backup = sibling(&path, "corrupt");
                    warn!(
                        "Unreadable preferences at {} ({e}), moving them to {}",
                        path.display(),
                        backup.display()
                    );
                    fs::rename(&path, &backup).map_err(|e| {
                        HotFinderError::Storage(format!("failed to move aside {}: {e}", path.display()))
                    })?;
                    Map::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(HotFinderError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        Ok(JsonFilePreferenceStore {
            path,
            values: Mutex::new(values),
        })
    }

    fn update(&self, change: impl FnOnce(&mut Map<String, Value>)) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| HotFinderError::Storage(e.to_string()))?;

        let mut updated = values.clone();
        change(&mut updated);
        self.persist(&updated)?;

        *values = updated;
        Ok(())
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| HotFinderError::Storage(e.to_string()))?;

        let staging = sibling(&self.path, "tmp");
        fs::write(&staging, json).map_err(|e| {
            HotFinderError::Storage(format!("failed to write {}: {e}", staging.display()))
        })?;
        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            HotFinderError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

/// `prefs.json` -> `prefs.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = JsonFilePreferenceStore::open(&path).unwrap();
        store.save("filters", json!({ "minViews": 10 })).unwrap();
        store.save("other", json!([1, 2])).unwrap();
        store.remove("other").unwrap();

        let reopened = JsonFilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.load("filters"), Some(json!({ "minViews": 10 })));
        assert_eq!(reopened.load("other"), None);
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("prefs.json");

        let store = JsonFilePreferenceStore::open(&path).unwrap();
        let result = store.save("filters", json!({ "minViews": 10 }));

        assert!(matches!(result, Err(HotFinderError::Storage(_))));
        assert_eq!(store.load("filters"), None);
    }

    #[test]
    fn corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFilePreferenceStore::open(&path).unwrap();
        assert_eq!(store.load("filters"), None);
        assert_eq!(
            fs::read_to_string(sibling(&path, "corrupt")).unwrap(),
            "{ not json"
        );

        store.save("filters", json!({})).unwrap();
        let reopened = JsonFilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.load("filters"), Some(json!({})));
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file.
        let result = JsonFilePreferenceStore::open(dir.path());
        assert!(matches!(result, Err(HotFinderError::Storage(_))));
    }
}
