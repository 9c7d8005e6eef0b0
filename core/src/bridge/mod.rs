//! Host bridge
//!
//! This module provides:
//! - **Requests**: `send` POSTs a JSON body to `https://{resource}/{action}`
//!   and decodes the host's JSON answer
//! - **Events**: `subscribe` registers handlers for host-originated messages,
//!   `deliver` routes a raw message to them by its `type` field
//!
//! The bridge knows nothing about panels.

mod dispatch;
mod error;
mod transport;

#[cfg(test)]
mod bridge_tests;

pub use dispatch::{Dispatcher, Subscription};
pub use error::{BridgeError, ProtocolError};
pub use transport::{HttpTransport, LoopbackTransport, RecordedRequest, Transport};

use lifeline_types::{CloseComponent, Environment, OutboundRequest, OverlayConfig, actions};
use serde::Serialize;
use serde_json::{Map, Value};

/// Accessor for the host's resource name.
///
/// Queried on every request; `None` means no host is attached.
pub trait HostEnvironment {
    fn resource_name(&self) -> Option<String>;
}

/// No host attached (plain browser or native harness)
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl HostEnvironment for Detached {
    fn resource_name(&self) -> Option<String> {
        None
    }
}

/// Host with a fixed, known resource name
#[derive(Debug, Clone)]
pub struct FixedResource(pub String);

impl HostEnvironment for FixedResource {
    fn resource_name(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Message-passing boundary between the overlay and its host
#[derive(Debug)]
pub struct Bridge<T, H = Detached> {
    transport: T,
    host: H,
    environment: Environment,
    fallback_resource: String,
    debug: bool,
    events: Dispatcher,
}

impl<T: Transport, H: HostEnvironment> Bridge<T, H> {
    pub fn new(transport: T, host: H, config: &OverlayConfig) -> Self {
        Self {
            transport,
            host,
            environment: config.environment,
            fallback_resource: config.fallback_resource.clone(),
            debug: config.debug,
            events: Dispatcher::new(),
        }
    }

    /// Whether the host accessor currently reports a resource
    pub fn is_attached(&self) -> bool {
        self.host.resource_name().is_some()
    }

    /// Resource name for the next request, falling back to the placeholder
    pub fn resource(&self) -> String {
        self.host
            .resource_name()
            .unwrap_or_else(|| self.fallback_resource.clone())
    }

    pub fn request_url(&self, action: &str) -> String {
        format!("https://{}/{}", self.resource(), action)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outbound
    // ─────────────────────────────────────────────────────────────────────────

    /// Send `payload` to the host as request `action` and decode its answer.
    ///
    /// In development any failure resolves to an empty object so the UI keeps
    /// rendering without a live host. In production the error is returned.
    pub async fn send<P>(&self, action: &str, payload: &P) -> Result<Value, BridgeError>
    where
        P: Serialize + ?Sized,
    {
        let url = self.request_url(action);
        match self.round_trip(action, &url, payload).await {
            Ok(response) => {
                if self.debug {
                    tracing::info!(action, %response, "host response");
                }
                Ok(response)
            }
            Err(err) if self.environment.is_development() => {
                tracing::warn!(action, error = %err, "host request failed, using empty response");
                Ok(empty_object())
            }
            Err(err) => {
                tracing::error!(action, error = %err, "host request failed");
                Err(err)
            }
        }
    }

    async fn round_trip<P>(&self, action: &str, url: &str, payload: &P) -> Result<Value, BridgeError>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_string(payload).map_err(|source| BridgeError::Encode {
            action: action.to_string(),
            source,
        })?;

        if self.debug {
            tracing::info!(action, url, body = %body, "sending host request");
        }

        let text = self
            .transport
            .post(url, body)
            .await
            .map_err(|reason| BridgeError::Transport {
                action: action.to_string(),
                reason,
            })?;

        serde_json::from_str(&text).map_err(|source| BridgeError::Decode {
            action: action.to_string(),
            source,
        })
    }

    pub async fn send_request(&self, request: &OutboundRequest) -> Result<Value, BridgeError> {
        self.send(&request.action, &request.payload).await
    }

    /// Ask the host to close the legacy panel
    pub async fn close(&self) -> Result<Value, BridgeError> {
        self.send(actions::CLOSE, &empty_object()).await
    }

    /// Ask the host to close one named panel
    pub async fn close_component(&self, component: &str) -> Result<Value, BridgeError> {
        let payload = CloseComponent {
            component: component.to_string(),
        };
        self.send(actions::CLOSE, &payload).await
    }

    /// Ask the host to push fresh legacy server data
    pub async fn request_server_data(&self) -> Result<Value, BridgeError> {
        self.send(actions::GET_SERVER_DATA, &empty_object()).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inbound
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscriber table, for components that bind several handlers at once
    pub fn events(&self) -> &Dispatcher {
        &self.events
    }

    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        handler: impl Fn(&Value) + 'static,
    ) -> Subscription {
        self.events.subscribe(event_type, handler)
    }

    /// Route one inbound message to the subscribers of its `type`.
    ///
    /// Handlers receive the flat payload with `type` removed. Returns the
    /// number of handlers invoked; unmatched types invoke none.
    pub fn deliver(&self, message: &Value) -> Result<usize, ProtocolError> {
        let Value::Object(fields) = message else {
            return Err(ProtocolError::NotAnObject);
        };
        let Some(Value::String(event_type)) = fields.get("type") else {
            return Err(ProtocolError::MissingType);
        };

        let mut payload = fields.clone();
        payload.remove("type");
        let payload = Value::Object(payload);

        if self.debug {
            tracing::info!(event_type = %event_type, %payload, "inbound event");
        }

        let invoked = self.events.dispatch(event_type, &payload);
        if invoked == 0 {
            tracing::trace!(event_type = %event_type, "no subscribers for inbound event");
        }
        Ok(invoked)
    }

    /// Parse and deliver a raw JSON message, logging and dropping bad input
    pub fn deliver_json(&self, raw: &str) -> usize {
        let result = serde_json::from_str::<Value>(raw)
            .map_err(ProtocolError::InvalidJson)
            .and_then(|message| self.deliver(&message));

        match result {
            Ok(invoked) => invoked,
            Err(err) => {
                tracing::debug!(error = %err, "dropped inbound message");
                0
            }
        }
    }
}
