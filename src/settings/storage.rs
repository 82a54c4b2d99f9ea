use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};

const STATE_DIR_NAME: &str = "skillgraph";

/// Small string key/value persistence shared by every view.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key. Writes go through a temporary file and a
/// rename so a reader never observes half a document.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn default_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("could not determine the local data directory")?
            .join(STATE_DIR_NAME);
        Ok(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let temp_path = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&temp_path, value)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).unwrap();

        assert_eq!(store.get("graph-visited").unwrap(), None);
        store.set("graph-visited", r#"["index"]"#).unwrap();
        store.set("graph-visited", r#"["index","a"]"#).unwrap();
        assert_eq!(
            store.get("graph-visited").unwrap().as_deref(),
            Some(r#"["index","a"]"#)
        );
        assert!(!store.dir().join(".graph-visited.json.tmp").exists());
    }

    #[test]
    fn memory_store_overwrites_values() {
        let store = MemoryStore::default();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}
