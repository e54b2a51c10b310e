//! Remote browser client traits
//!
//! Abstract interfaces for attaching to an already-running browser and
//! managing isolated execution contexts on it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::session::SessionState;

/// Remote browser client trait
///
/// Connects to a remote debugging endpoint and yields a browser handle.
/// Connect carries no built-in timeout; the context factory races it
/// against its own deadline.
#[async_trait]
pub trait BrowserClient: Send + Sync + std::fmt::Debug {
    /// Connect to the given endpoint
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn BrowserHandle>, crate::Error>;
}

/// Handle to a connected browser
#[async_trait]
pub trait BrowserHandle: Send + Sync + std::fmt::Debug {
    /// Create a new isolated execution context, optionally hydrated with
    /// previously persisted session state
    async fn new_context(
        &self,
        initial_state: Option<SessionState>,
    ) -> Result<Arc<dyn ExecutionContext>, crate::Error>;
}

/// A live execution context on a connected browser
#[async_trait]
pub trait ExecutionContext: Send + Sync + std::fmt::Debug {
    /// Context ID (for diagnostics)
    fn id(&self) -> &str;

    /// Snapshot the accumulated session state (cookies etc.)
    async fn snapshot_state(&self) -> Result<SessionState, crate::Error>;

    /// Release the context and its resources
    async fn release(&self) -> Result<(), crate::Error>;

    /// Check if the context is still active
    fn is_active(&self) -> bool;
}

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<serde_json::Value>,
    /// Error if any
    pub error: Option<CdpErrorDetail>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}
