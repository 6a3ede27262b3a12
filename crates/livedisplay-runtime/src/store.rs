//! JSON-file key-value store.

use livedisplay_types::{Error as StoreError, KeyValueStore, Result as StoreResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// String map persisted as one JSON object, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring malformed store");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read store");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    fn write(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)
            .map_err(|err| StoreError::Storage(format!("{}: {}", self.path.display(), err)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.write()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.entries.remove(key).is_some() {
            self.write()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedisplay_types::keys;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("data").join("store.json");

        let mut store = FileStore::open(&path);
        store.set(keys::TIMEOUT, "25")?;
        store.set(keys::THEME, "invert")?;
        store.remove(keys::THEME)?;

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(keys::TIMEOUT).as_deref(), Some("25"));
        assert!(reopened.get(keys::THEME).is_none());
        Ok(())
    }

    #[test]
    fn test_malformed_file_opens_empty() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "[1, 2")?;

        let store = FileStore::open(&path);
        assert!(store.entries().is_empty());
        Ok(())
    }
}
