//! In-memory session store
//!
//! Backs tests and single-process embeddings. Supports read/write failure
//! injection for exercising the factory's degraded paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::session::SessionState;
use crate::store::SessionStore;
use crate::Error;

/// In-memory session store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, SessionState>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    put_count: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make all subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a value directly (for tests)
    pub async fn seed(&self, key: &str, state: SessionState) {
        self.entries.write().await.insert(key.to_string(), state);
    }

    /// Number of successful writes observed
    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<SessionState>, Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::store("Simulated read failure"));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, state: &SessionState) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::store("Simulated write failure"));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), state.clone());
        self.put_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        let state = SessionState::new(json!({"cookies": []}));

        store.put("storage_state", &state).await.unwrap();
        let loaded = store.get("storage_state").await.unwrap();

        assert_eq!(loaded, Some(state));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        let state = SessionState::new(json!({}));

        store.fail_reads(true);
        assert!(matches!(store.get("k").await, Err(Error::Store(_))));

        store.fail_writes(true);
        assert!(matches!(store.put("k", &state).await, Err(Error::Store(_))));

        store.fail_reads(false);
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
