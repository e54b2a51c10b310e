//! # Session layer
//!
//! The session-aware connection factory and its handles. A factory attaches
//! to a shared browser, hydrates new execution contexts from persisted
//! session state, and hands out handles that persist updated state on save
//! or close.
//!
//! ## Module structure
//! - `state`: opaque session state blob
//! - `factory`: the connection factory
//! - `handle`: per-context handle with save/close lifecycle

pub mod factory;
pub mod handle;
pub mod state;


pub use factory::ContextFactory;
pub use handle::{ContextHandle, SessionSaver};
pub use state::SessionState;
