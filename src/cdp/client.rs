//! CDP browser client implementation
//!
//! Attaches to a running browser over its DevTools WebSocket and manages
//! isolated browser contexts via the Target and Storage domains.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cdp::connection::CdpConnection;
use crate::cdp::traits::{BrowserClient, BrowserHandle, ExecutionContext};
use crate::session::SessionState;
use crate::Error;

/// Browser client speaking the Chrome DevTools Protocol
#[derive(Debug, Default)]
pub struct CdpBrowserClient;

impl CdpBrowserClient {
    /// Create a new CDP browser client
    pub fn new() -> Self {
        Self
    }

    /// Resolve an endpoint to a browser WebSocket URL.
    ///
    /// `ws://`/`wss://` endpoints are used as-is; `http(s)://` endpoints are
    /// resolved through `GET /json/version` (`webSocketDebuggerUrl`).
    async fn resolve_ws_url(endpoint: &str) -> Result<String, Error> {
        if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
            return Ok(endpoint.to_string());
        }

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
            debug!("Resolving browser WebSocket URL via {}", version_url);

            let body: Value = reqwest::get(&version_url)
                .await
                .map_err(|e| Error::websocket(format!("Endpoint resolution failed: {}", e)))?
                .json()
                .await
                .map_err(|e| Error::websocket(format!("Invalid /json/version response: {}", e)))?;

            return body
                .get("webSocketDebuggerUrl")
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| Error::cdp("No webSocketDebuggerUrl in /json/version response"));
        }

        Err(Error::configuration(format!(
            "Unsupported endpoint scheme: {}",
            endpoint
        )))
    }
}

#[async_trait]
impl BrowserClient for CdpBrowserClient {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn BrowserHandle>, Error> {
        let ws_url = Self::resolve_ws_url(endpoint).await?;
        let connection = CdpConnection::open(&ws_url).await?;
        info!("Connected to browser at {}", ws_url);
        Ok(Arc::new(CdpBrowserHandle { connection }))
    }
}

/// Handle to a browser reached over CDP
#[derive(Debug)]
pub struct CdpBrowserHandle {
    connection: Arc<CdpConnection>,
}

#[async_trait]
impl BrowserHandle for CdpBrowserHandle {
    async fn new_context(
        &self,
        initial_state: Option<SessionState>,
    ) -> Result<Arc<dyn ExecutionContext>, Error> {
        let result = self
            .connection
            .send_command("Target.createBrowserContext", json!({}))
            .await?;

        let context_id = result
            .get("browserContextId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::cdp("Target.createBrowserContext returned no context id"))?
            .to_string();

        debug!("Created browser context {}", context_id);

        let context = CdpExecutionContext {
            context_id,
            connection: Arc::clone(&self.connection),
            active: AtomicBool::new(true),
        };

        if let Some(state) = initial_state {
            context.hydrate(&state).await?;
        }

        Ok(Arc::new(context))
    }
}

/// An isolated browser context reached over CDP
#[derive(Debug)]
pub struct CdpExecutionContext {
    context_id: String,
    connection: Arc<CdpConnection>,
    active: AtomicBool,
}

impl CdpExecutionContext {
    /// Apply persisted cookies to this context
    async fn hydrate(&self, state: &SessionState) -> Result<(), Error> {
        let cookies = state
            .as_value()
            .get("cookies")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if cookies.is_empty() {
            return Ok(());
        }

        self.connection
            .send_command(
                "Storage.setCookies",
                json!({
                    "cookies": cookies,
                    "browserContextId": self.context_id,
                }),
            )
            .await?;

        debug!(
            "Hydrated context {} with {} cookies",
            self.context_id,
            cookies.len()
        );
        Ok(())
    }
}

#[async_trait]
impl ExecutionContext for CdpExecutionContext {
    fn id(&self) -> &str {
        &self.context_id
    }

    async fn snapshot_state(&self) -> Result<SessionState, Error> {
        let result = self
            .connection
            .send_command(
                "Storage.getCookies",
                json!({ "browserContextId": self.context_id }),
            )
            .await?;

        let cookies = result.get("cookies").cloned().unwrap_or_else(|| json!([]));

        // Same shape as a Playwright storage-state blob so states persisted
        // by either side stay interchangeable.
        Ok(SessionState::new(json!({
            "cookies": cookies,
            "origins": [],
        })))
    }

    async fn release(&self) -> Result<(), Error> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.connection
            .send_command(
                "Target.disposeBrowserContext",
                json!({ "browserContextId": self.context_id }),
            )
            .await?;

        debug!("Disposed browser context {}", self.context_id);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ws_url_passthrough() {
        let url = CdpBrowserClient::resolve_ws_url("ws://localhost:9222/devtools/browser/abc")
            .await
            .unwrap();
        assert_eq!(url, "ws://localhost:9222/devtools/browser/abc");
    }

    #[tokio::test]
    async fn test_resolve_ws_url_rejects_unknown_scheme() {
        let result = CdpBrowserClient::resolve_ws_url("ftp://localhost:9222").await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
