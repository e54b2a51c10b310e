//! # Session store layer
//!
//! Key-value persistence for session state blobs. The store is a shared
//! external resource with last-writer-wins semantics; this crate adds no
//! locking on top of it.
//!
//! ## Module structure
//! - `memory`: in-process store with failure injection for tests
//! - `file`: one JSON blob per key under a directory

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::session::SessionState;

/// Key-value store for session state
///
/// `get` distinguishes three outcomes: present (`Ok(Some)`), absent
/// (`Ok(None)`), and unavailable (`Err`). The context factory treats the
/// last two the same, logging a diagnostic for the error case.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Read the state blob stored under `key`
    async fn get(&self, key: &str) -> Result<Option<SessionState>, crate::Error>;

    /// Write the state blob under `key`
    async fn put(&self, key: &str, state: &SessionState) -> Result<(), crate::Error>;
}

pub use file::FileStore;
pub use memory::MemoryStore;
