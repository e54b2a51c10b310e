//! CDP WebSocket connection
//!
//! WebSocket transport to a Chrome DevTools Protocol browser endpoint with
//! command/response correlation.

use crate::cdp::traits::{CdpErrorDetail, CdpResponse};
use crate::Error;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Timeout for a single in-flight CDP command (seconds). This bounds
/// individual protocol calls after the connection is up; the connect
/// deadline itself belongs to the context factory.
const COMMAND_TIMEOUT_SECS: u64 = 30;

/// WebSocket connection to a CDP browser target
pub struct CdpConnection {
    /// Write half of the WebSocket
    sink: Mutex<WsSink>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>,
    /// Is connection active
    active: Arc<AtomicBool>,
}

impl std::fmt::Debug for CdpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpConnection")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl CdpConnection {
    /// Open a connection to a CDP WebSocket URL
    /// (e.g., "ws://localhost:9222/devtools/browser/ABC123")
    pub async fn open(url: &str) -> Result<Arc<Self>, Error> {
        debug!("Opening CDP WebSocket connection to {}", url);

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;
        let (sink, source) = ws_stream.split();

        let connection = Arc::new(Self {
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            active: Arc::new(AtomicBool::new(true)),
        });

        let pending = Arc::clone(&connection.pending);
        let active = Arc::clone(&connection.active);
        tokio::spawn(async move {
            Self::read_loop(source, pending, active).await;
            debug!("CDP read loop exited");
        });

        Ok(connection)
    }

    /// Send a CDP command and wait for the matching response
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, Error> {
        if !self.is_active() {
            return Err(Error::websocket("Connection is closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::json!({
            "id": id,
            "method": method,
            "params": params,
        });

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        debug!("CDP send: id={} method={}", id, method);
        {
            let mut sink = self.sink.lock().await;
            if let Err(e) = sink.send(Message::Text(frame.to_string())).await {
                self.pending.lock().await.remove(&id);
                return Err(Error::websocket(format!("Failed to send command: {}", e)));
            }
        }

        let response = match tokio::time::timeout(
            tokio::time::Duration::from_secs(COMMAND_TIMEOUT_SECS),
            rx,
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(Error::websocket(format!(
                    "Connection dropped while awaiting response to {}",
                    method
                )))
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(Error::cdp(format!("Command {} timed out", method)));
            }
        };

        if let Some(err) = response.error {
            return Err(Error::cdp(format!(
                "{} failed: {} (code {})",
                method, err.message, err.code
            )));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Close the connection
    pub async fn close(&self) -> Result<(), Error> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            warn!("Error sending close frame: {}", e);
        }
        Ok(())
    }

    /// Check if connection is active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Read incoming frames and route responses to pending commands
    async fn read_loop(
        mut source: WsSource,
        pending: Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>,
        active: Arc<AtomicBool>,
    ) {
        while active.load(Ordering::SeqCst) {
            let message = match source.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                None => {
                    debug!("WebSocket stream closed by remote");
                    break;
                }
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Ping/pong handled by tungstenite; CDP sends no binary frames
                _ => continue,
            };

            let value: Value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Malformed CDP frame: {}", e);
                    continue;
                }
            };

            // Frames without an id are events; this client issues no
            // event subscriptions, so they are dropped.
            let Some(id) = value.get("id").and_then(Value::as_u64) else {
                continue;
            };

            let response = CdpResponse {
                id,
                result: value.get("result").cloned(),
                error: value.get("error").map(|err| CdpErrorDetail {
                    code: err.get("code").and_then(Value::as_i64).unwrap_or(0) as i32,
                    message: err
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                }),
            };

            if let Some(sender) = pending.lock().await.remove(&id) {
                let _ = sender.send(response);
            } else {
                debug!("Response for unknown command id={}", id);
            }
        }

        active.store(false, Ordering::SeqCst);

        // Fail any commands still in flight so callers do not hang
        let mut pending = pending.lock().await;
        pending.clear();
    }
}
