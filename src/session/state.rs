//! Session state blob
//!
//! Opaque, serializable session data (cookies, local storage, ...). This
//! crate never interprets its structure; it is passed verbatim between the
//! store and the browser client.

use serde::{Deserialize, Serialize};

/// Opaque session state blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(serde_json::Value);

impl SessionState {
    /// Wrap a JSON value as session state
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwrap into the underlying JSON value
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for SessionState {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
