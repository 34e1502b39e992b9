/*!
 * Preference Storage
 * String key/value storage backing persisted clipboard state
 */

use crate::core::errors::{ClipboardError, ClipboardResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persisted key/value preferences
pub trait PreferenceStore: Send + Sync {
    fn get_string(&self, key: &str) -> ClipboardResult<Option<String>>;

    fn put_string(&self, key: &str, value: &str) -> ClipboardResult<()>;

    fn remove(&self, key: &str) -> ClipboardResult<()>;
}

/// Volatile preferences, lost with the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, key: &str) -> ClipboardResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> ClipboardResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClipboardResult<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Preferences kept as one JSON object on disk.
///
/// Values are cached in memory; every write rewrites the file through a
/// sibling temp file and a rename.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFilePreferences {
    /// Open (or lazily create) the preference file at `path`
    pub fn open(path: impl Into<PathBuf>) -> ClipboardResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), keys = values.len(), "Opened preference file");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> ClipboardResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            ClipboardError::Storage(format!("rename {}: {}", tmp.display(), e))
        })?;
        debug!(path = %self.path.display(), "Preferences flushed");
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get_string(&self, key: &str) -> ClipboardResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> ClipboardResult<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> ClipboardResult<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}
