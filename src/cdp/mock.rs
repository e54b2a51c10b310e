//! Mock browser client for testing
//!
//! In-memory implementations of the browser client traits with configurable
//! connect latency and failure injection.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cdp::traits::{BrowserClient, BrowserHandle, ExecutionContext};
use crate::session::SessionState;
use crate::Error;

/// Mock browser client
#[derive(Debug, Default)]
pub struct MockBrowserClient {
    /// Artificial delay before connect completes
    connect_delay: Option<tokio::time::Duration>,
    /// Connect attempts observed
    connect_count: AtomicUsize,
    /// Shared handle returned by every connect, so tests can inspect contexts
    handle: Arc<MockBrowserHandle>,
}

impl MockBrowserClient {
    /// Create a mock client whose connects complete immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client whose connects complete after `delay`
    pub fn with_connect_delay(delay: tokio::time::Duration) -> Self {
        Self {
            connect_delay: Some(delay),
            ..Self::default()
        }
    }

    /// The browser handle this client hands out
    pub fn handle(&self) -> Arc<MockBrowserHandle> {
        Arc::clone(&self.handle)
    }

    /// Number of connect attempts made so far
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserClient for MockBrowserClient {
    async fn connect(&self, _endpoint: &str) -> Result<Arc<dyn BrowserHandle>, Error> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Arc::clone(&self.handle) as Arc<dyn BrowserHandle>)
    }
}

/// Mock browser handle
#[derive(Debug, Default)]
pub struct MockBrowserHandle {
    contexts: RwLock<Vec<Arc<MockExecutionContext>>>,
    /// When set, release() on created contexts fails
    fail_release: AtomicBool,
}

impl MockBrowserHandle {
    /// Make release() fail on all contexts created after this call
    pub fn fail_release(&self, fail: bool) {
        self.fail_release.store(fail, Ordering::SeqCst);
    }

    /// Contexts created through this handle
    pub async fn contexts(&self) -> Vec<Arc<MockExecutionContext>> {
        self.contexts.read().await.clone()
    }
}

#[async_trait]
impl BrowserHandle for MockBrowserHandle {
    async fn new_context(
        &self,
        initial_state: Option<SessionState>,
    ) -> Result<Arc<dyn ExecutionContext>, Error> {
        let context = Arc::new(MockExecutionContext {
            id: Uuid::new_v4().to_string(),
            hydrated_with: initial_state.clone(),
            state: RwLock::new(
                initial_state.unwrap_or_else(|| SessionState::new(serde_json::json!({}))),
            ),
            active: AtomicBool::new(true),
            fail_release: AtomicBool::new(self.fail_release.load(Ordering::SeqCst)),
        });
        self.contexts.write().await.push(Arc::clone(&context));
        Ok(context)
    }
}

/// Mock execution context holding its state in memory
#[derive(Debug)]
pub struct MockExecutionContext {
    id: String,
    hydrated_with: Option<SessionState>,
    state: RwLock<SessionState>,
    active: AtomicBool,
    fail_release: AtomicBool,
}

impl MockExecutionContext {
    /// The state this context was hydrated with at creation, if any
    pub fn hydrated_with(&self) -> Option<&SessionState> {
        self.hydrated_with.as_ref()
    }

    /// Mutate the live state (simulates browsing activity)
    pub async fn set_state(&self, state: SessionState) {
        *self.state.write().await = state;
    }
}

#[async_trait]
impl ExecutionContext for MockExecutionContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn snapshot_state(&self) -> Result<SessionState, Error> {
        Ok(self.state.read().await.clone())
    }

    async fn release(&self) -> Result<(), Error> {
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(Error::cdp("Simulated release failure"));
        }
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
