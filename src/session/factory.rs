//! Session-aware connection factory
//!
//! Produces ready-to-use execution contexts on a shared browser, hydrated
//! from previously persisted session state when available.

use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::cdp::traits::BrowserClient;
use crate::cdp::CdpBrowserClient;
use crate::config::{Config, DEFAULT_SESSION_KEY};
use crate::session::handle::ContextHandle;
use crate::session::SessionState;
use crate::store::{FileStore, SessionStore};
use crate::{Error, Result};

/// Session-aware connection factory
///
/// Holds only fixed configuration; `create_context` may be called any number
/// of times, each call yielding an independent [`ContextHandle`].
#[derive(Debug)]
pub struct ContextFactory {
    endpoint: String,
    client: Arc<dyn BrowserClient>,
    store: Option<Arc<dyn SessionStore>>,
    session_key: String,
    connect_timeout: Duration,
}

impl ContextFactory {
    /// Create a factory for the given endpoint and browser client.
    ///
    /// Without a store (see [`with_store`](Self::with_store)) persistence is
    /// disabled entirely.
    pub fn new<S: Into<String>>(endpoint: S, client: Arc<dyn BrowserClient>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            store: None,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            connect_timeout: Duration::from_secs(crate::config::DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Create a factory from configuration, speaking CDP to the endpoint.
    /// A file-backed store is attached when `state_dir` is set.
    pub fn from_config(config: &Config) -> Self {
        let mut factory = Self::new(&config.endpoint, Arc::new(CdpBrowserClient::new()))
            .with_session_key(&config.session_key)
            .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(dir) = &config.state_dir {
            factory = factory.with_store(Arc::new(FileStore::new(dir)));
        }
        factory
    }

    /// Attach a session store; enables hydration and persistence
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the session key. One factory uses exactly one key for its
    /// entire lifetime.
    pub fn with_session_key<S: Into<String>>(mut self, key: S) -> Self {
        self.session_key = key.into();
        self
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The key this factory persists session state under
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Connect, hydrate, and create an execution context.
    ///
    /// The connect attempt is raced against the configured timeout;
    /// whichever completes first wins and the loser is discarded. An elapsed
    /// timeout surfaces as [`Error::ConnectTimeout`]; store trouble never
    /// aborts the call and degrades to an unhydrated context with a logged
    /// diagnostic.
    pub async fn create_context(&self) -> Result<ContextHandle> {
        let browser = match tokio::time::timeout(
            self.connect_timeout,
            self.client.connect(&self.endpoint),
        )
        .await
        {
            Ok(connected) => connected?,
            Err(_) => {
                return Err(Error::connect_timeout(format!(
                    "No connection to {} within {}s",
                    self.endpoint,
                    self.connect_timeout.as_secs()
                )))
            }
        };

        let initial_state = self.load_session_state().await;
        let hydrated = initial_state.is_some();

        let context = browser.new_context(initial_state).await?;
        info!(
            context_id = context.id(),
            hydrated, "Created execution context"
        );

        Ok(ContextHandle::new(
            context,
            self.store.clone(),
            self.session_key.clone(),
        ))
    }

    /// Read persisted state for this factory's key. Absence and read
    /// failures both yield `None`; only the latter logs a diagnostic.
    async fn load_session_state(&self) -> Option<SessionState> {
        let store = self.store.as_ref()?;
        match store.get(&self.session_key).await {
            Ok(Some(state)) => {
                debug!(key = %self.session_key, "Loaded session state from store");
                Some(state)
            }
            Ok(None) => {
                debug!(key = %self.session_key, "No prior session state");
                None
            }
            Err(e) => {
                warn!(key = %self.session_key, "Failed to load session state: {}", e);
                None
            }
        }
    }
}
