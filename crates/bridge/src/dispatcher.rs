use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::{BridgeError, BridgeMessage};

/// A registered message handler.
pub type HandlerFn = Box<dyn Fn(serde_json::Value) -> Result<(), BridgeError> + Send + Sync>;

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A handler accepted the message.
    Handled,
    /// No handler is registered for the kind; dropped.
    Unknown,
    /// The message or its payload was invalid, or the handler failed; dropped.
    Rejected,
}

/// Routes bridge messages to handlers by kind.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerFn>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler that receives the raw JSON payload.
    ///
    /// A later registration for the same kind replaces the earlier one.
    pub fn on<F>(&mut self, kind: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(serde_json::Value) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.handlers.insert(kind.clone(), Box::new(handler)).is_some() {
            debug!(kind = %kind, "replaced bridge handler");
        }
        self
    }

    /// Registers a handler whose payload is decoded into `T` first.
    ///
    /// Payloads that do not decode are rejected before the handler runs.
    pub fn on_payload<T, F>(&mut self, kind: impl Into<String>, handler: F) -> &mut Self
    where
        T: DeserializeOwned,
        F: Fn(T) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        self.on(kind, move |data| {
            let payload: T = serde_json::from_value(data)?;
            handler(payload)
        })
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn handles(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Dispatches a parsed message.
    pub fn dispatch(&self, msg: BridgeMessage) -> Dispatched {
        let Some(handler) = self.handlers.get(&msg.kind) else {
            warn!(kind = %msg.kind, "unknown bridge message kind, dropping");
            return Dispatched::Unknown;
        };

        trace!(kind = %msg.kind, "dispatching bridge message");
        match handler(msg.data) {
            Ok(()) => Dispatched::Handled,
            Err(e) => {
                warn!(kind = %msg.kind, error = %e, "bridge handler rejected message");
                Dispatched::Rejected
            }
        }
    }

    /// Parses and dispatches a raw JSON message.
    pub fn dispatch_json(&self, text: &str) -> Dispatched {
        let msg: BridgeMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                warn!("failed to parse bridge message: {e}");
                return Dispatched::Rejected;
            }
        };
        self.dispatch(msg)
    }
}
