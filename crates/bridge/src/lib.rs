//! Tagged-message dispatcher for host bridge events.
//!
//! The embedding host posts JSON objects of the form
//! `{"type": "<kind>", "data": {...}}`. A [`Dispatcher`] maps each kind
//! to a handler. Malformed messages, unknown kinds, and payloads that do
//! not match the handler's type are logged and dropped; dispatch never
//! fails.

mod dispatcher;

pub use dispatcher::{Dispatched, Dispatcher, HandlerFn};

use serde::{Deserialize, Serialize};

/// Message kinds posted by the mini-program host.
pub mod kinds {
    /// The host finished a login and hands over credentials.
    pub const LOGIN: &str = "login";
    /// The host asks the page to navigate.
    pub const NAVIGATE: &str = "navigate";
    /// The host reports the outcome of a share sheet.
    pub const SHARE: &str = "share";
    /// The host reports the outcome of a payment.
    pub const PAYMENT: &str = "payment";
}

/// Errors raised by handlers.
///
/// These never escape [`Dispatcher::dispatch`]; they are logged there.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("handler failed: {0}")]
    Handler(String),
}

/// A message posted across the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl BridgeMessage {
    /// Creates a message with the given kind and payload.
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}
