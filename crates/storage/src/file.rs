//! JSON-file flag store.
//!
//! The whole flag set is one JSON object on disk. It is read on first use
//! and rewritten after every mutation (temp file + rename), so a crash
//! never leaves a half-written file behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StorageError;
use crate::traits::FlagStore;

pub struct JsonFileFlagStore {
    path: PathBuf,
    /// `None` until the file has been read.
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl JsonFileFlagStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the file on first use; later calls reuse the cached map.
    async fn loaded<'a>(
        &self,
        slot: &'a mut Option<BTreeMap<String, String>>,
    ) -> Result<&'a mut BTreeMap<String, String>, StorageError> {
        if slot.is_none() {
            *slot = Some(self.read_file().await?);
        }
        Ok(slot.get_or_insert_with(BTreeMap::new))
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), flags = entries.len(), "flag file written");
        Ok(())
    }
}

#[async_trait]
impl FlagStore for JsonFileFlagStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut guard = self.entries.lock().await;
        let entries = self.loaded(&mut guard).await?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().await;
        let entries = self.loaded(&mut guard).await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_file(entries).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().await;
        let entries = self.loaded(&mut guard).await?;
        if entries.remove(key).is_some() {
            self.write_file(entries).await?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flags_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.json");

        let store = JsonFileFlagStore::new(&path);
        store.put("Acme_Gold", "1").await.unwrap();
        store.put("Acme_Silver", "1").await.unwrap();
        store.delete("Acme_Silver").await.unwrap();

        let reopened = JsonFileFlagStore::new(&path);
        assert_eq!(reopened.get("Acme_Gold").await.unwrap().as_deref(), Some("1"));
        assert!(reopened.get("Acme_Silver").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileFlagStore::new(&dir.path().join("absent.json"));
        assert!(store.get("anything").await.unwrap().is_none());
        // Deleting from an empty store must not create the file.
        store.delete("anything").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/flags.json");
        let store = JsonFileFlagStore::new(&path);
        store.put("k", "1").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileFlagStore::new(&path);
        assert!(matches!(store.get("k").await, Err(StorageError::Corrupt(_))));
    }
}
