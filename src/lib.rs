//! Session-Relay: session-aware browser context factory
//!
//! Connects to a shared, already-running browser over the Chrome DevTools
//! Protocol, reuses previously persisted session state when creating
//! execution contexts, and persists updated state on save or close.

pub mod config;
pub mod error;

pub mod cdp;
pub mod session;
pub mod store;

// Re-exports
pub use cdp::{BrowserClient, BrowserHandle, CdpBrowserClient, ExecutionContext};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{ContextFactory, ContextHandle, SessionSaver, SessionState};
pub use store::{FileStore, MemoryStore, SessionStore};

/// Session-Relay library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
