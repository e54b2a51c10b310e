//! # Remote browser client layer
//!
//! Connects to an already-running browser over the Chrome DevTools Protocol
//! and exposes isolated execution contexts on it.
//!
//! ## Module structure
//! - `traits`: abstract browser client interfaces
//! - `connection`: WebSocket transport with command/response correlation
//! - `client`: CDP-backed implementation
//! - `mock`: in-memory implementations for testing

pub mod client;
pub mod connection;
pub mod mock;
pub mod traits;

pub use client::{CdpBrowserClient, CdpBrowserHandle, CdpExecutionContext};
pub use connection::CdpConnection;
pub use traits::{BrowserClient, BrowserHandle, ExecutionContext};
