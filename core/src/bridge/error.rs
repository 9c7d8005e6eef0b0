//! Error types for host communication

use thiserror::Error;

/// Failures of a host-bound request
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host unreachable for '{action}': {reason}")]
    Transport { action: String, reason: String },

    #[error("failed to encode payload for '{action}'")]
    Encode {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("host returned a non-JSON body for '{action}'")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    pub fn action(&self) -> &str {
        match self {
            BridgeError::Transport { action, .. }
            | BridgeError::Encode { action, .. }
            | BridgeError::Decode { action, .. } => action,
        }
    }
}

/// Inbound messages the overlay cannot act on.
///
/// These are logged and dropped, never propagated to the render loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("inbound message is not a JSON object")]
    NotAnObject,

    #[error("inbound message has no string `type` field")]
    MissingType,

    #[error("inbound message is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("component message without componentId")]
    MissingComponentId,

    #[error("unknown action '{action}' for component '{component_id}'")]
    UnknownAction {
        component_id: String,
        action: String,
    },

    #[error("malformed '{event}' payload")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
