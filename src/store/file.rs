//! File-backed session store
//!
//! Persists each key as a JSON file under a base directory. Writes go
//! through a temp file and rename so a crashed write never leaves a
//! truncated blob behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::session::SessionState;
use crate::store::SessionStore;
use crate::Error;

/// File-backed session store
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`; the directory is created lazily
    /// on first write
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        // Keys map to file names; reject anything that could escape base_dir
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(Error::store(format!("Invalid store key: {:?}", key)));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<SessionState>, Error> {
        let path = self.path_for(key)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::store(format!("Read {} failed: {}", path.display(), e))),
        };

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::store(format!("Malformed blob at {}: {}", path.display(), e)))?;
        Ok(Some(SessionState::new(value)))
    }

    async fn put(&self, key: &str, state: &SessionState) -> Result<(), Error> {
        let path = self.path_for(key)?;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| Error::store(format!("Create store dir failed: {}", e)))?;

        let bytes = serde_json::to_vec(state.as_value())?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::store(format!("Write {} failed: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::store(format!("Rename to {} failed: {}", path.display(), e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let state = SessionState::new(json!({"cookies": [{"name": "sid", "value": "1"}]}));

        store.put("storage_state", &state).await.unwrap();
        let loaded = store.get("storage_state").await.unwrap();

        assert_eq!(loaded, Some(state));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("storage_state").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_blob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        tokio::fs::write(dir.path().join("storage_state.json"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            store.get("storage_state").await,
            Err(Error::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("../etc/passwd").await.is_err());
    }
}
