//! Connection handle
//!
//! Owns a live execution context from creation until close. Close persists
//! session state (when a store is configured) and then releases the context;
//! any use of the handle afterwards is a state error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cdp::traits::ExecutionContext;
use crate::session::SessionState;
use crate::store::SessionStore;
use crate::{Error, Result};

/// Handle to one created execution context
#[derive(Debug)]
pub struct ContextHandle {
    id: String,
    context: Arc<dyn ExecutionContext>,
    saver: Option<SessionSaver>,
    closed: Arc<AtomicBool>,
}

impl ContextHandle {
    pub(crate) fn new(
        context: Arc<dyn ExecutionContext>,
        store: Option<Arc<dyn SessionStore>>,
        session_key: String,
    ) -> Self {
        let closed = Arc::new(AtomicBool::new(false));
        let saver = store.map(|store| SessionSaver {
            context: Arc::clone(&context),
            store,
            session_key,
            closed: Arc::clone(&closed),
        });
        Self {
            id: Uuid::new_v4().to_string(),
            context,
            saver,
            closed,
        }
    }

    /// Handle ID (for diagnostics)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The live execution context
    pub fn context(&self) -> Result<Arc<dyn ExecutionContext>> {
        if self.is_closed() {
            return Err(Error::context_closed(self.id.clone()));
        }
        Ok(Arc::clone(&self.context))
    }

    /// The persistence operation, present only when the factory was
    /// configured with a store
    pub fn saver(&self) -> Option<&SessionSaver> {
        self.saver.as_ref()
    }

    /// Check if the handle has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Persist session state, then release the context.
    ///
    /// Persistence is skipped without a store. Release errors are swallowed;
    /// the caller is done with the context either way. A second close is a
    /// state error and performs no further persistence or release.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Error::context_closed(format!(
                "{} is already closed",
                self.id
            )));
        }

        if let Some(saver) = &self.saver {
            saver.persist().await;
        }

        if let Err(e) = self.context.release().await {
            warn!(handle_id = %self.id, "Error releasing context: {}", e);
        }
        debug!(handle_id = %self.id, "Handle closed");
        Ok(())
    }
}

/// Snapshot-and-persist operation for one handle
///
/// Store failures are absorbed with a logged diagnostic; a failed save never
/// affects the usability of the context.
#[derive(Debug)]
pub struct SessionSaver {
    context: Arc<dyn ExecutionContext>,
    store: Arc<dyn SessionStore>,
    session_key: String,
    closed: Arc<AtomicBool>,
}

impl SessionSaver {
    /// Snapshot current state from the context and write it to the store.
    /// Fails only when the owning handle is already closed.
    pub async fn save(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::context_closed(
                "save_session after close".to_string(),
            ));
        }
        self.persist().await;
        Ok(())
    }

    /// Best-effort snapshot and write; diagnostics only, never an error
    async fn persist(&self) {
        let state: SessionState = match self.context.snapshot_state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(key = %self.session_key, "Failed to snapshot session state: {}", e);
                return;
            }
        };

        match self.store.put(&self.session_key, &state).await {
            Ok(()) => info!(key = %self.session_key, "Saved session state"),
            Err(e) => {
                warn!(key = %self.session_key, "Failed to save session state: {}", e)
            }
        }
    }
}
