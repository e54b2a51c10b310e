//! End-to-end tests over the public API
//!
//! Covers the connect timeout against a real socket that never completes the
//! WebSocket handshake, and session persistence through the file store.

use serde_json::json;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::time::{Duration, Instant};

use session_relay::cdp::mock::MockBrowserClient;
use session_relay::{
    BrowserClient, CdpBrowserClient, ContextFactory, Error, FileStore, SessionState,
};

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A listener that accepts connections but never answers the upgrade
/// request, so the WebSocket handshake hangs until the factory's deadline.
async fn silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

#[tokio::test]
async fn test_connect_timeout_against_unresponsive_endpoint() {
    init_test_logging();
    let endpoint = silent_endpoint().await;
    let factory = ContextFactory::new(endpoint, Arc::new(CdpBrowserClient::new()))
        .with_connect_timeout(Duration::from_millis(300));

    let start = Instant::now();
    let result = factory.create_context().await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(Error::ConnectTimeout(_))));
    assert!(elapsed >= Duration::from_millis(250), "fired early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "fired late: {:?}", elapsed);
}

#[tokio::test]
async fn test_session_survives_across_factories_via_file_store() -> anyhow::Result<()> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let client = Arc::new(MockBrowserClient::new());

    let factory = ContextFactory::new("wss://fake", Arc::clone(&client) as Arc<dyn BrowserClient>)
        .with_store(Arc::new(FileStore::new(dir.path())));
    let handle = factory.create_context().await?;

    let state = SessionState::new(json!({
        "cookies": [{"name": "sid", "value": "xyz", "domain": "example.com"}],
        "origins": [],
    }));
    client.handle().contexts().await[0].set_state(state.clone()).await;
    handle.close().await?;

    // Same directory and default key, fresh factory
    let factory2 =
        ContextFactory::new("wss://fake", Arc::clone(&client) as Arc<dyn BrowserClient>)
        .with_store(Arc::new(FileStore::new(dir.path())));
    let _handle2 = factory2.create_context().await?;

    assert_eq!(
        client.handle().contexts().await[1].hydrated_with(),
        Some(&state)
    );
    Ok(())
}

#[tokio::test]
async fn test_fake_endpoint_without_store() {
    let factory = ContextFactory::new("wss://fake", Arc::new(MockBrowserClient::new()));

    let handle = factory.create_context().await.unwrap();
    assert!(handle.saver().is_none());
    handle.close().await.unwrap();
}
