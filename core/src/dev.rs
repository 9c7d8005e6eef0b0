//! Mock host events for running the overlay without a host

use std::time::Duration;

use lifeline_types::{events, panels};
use serde_json::{Value, json};

/// One inbound message and how long after startup to deliver it
#[derive(Debug, Clone, PartialEq)]
pub struct MockEvent {
    pub delay: Duration,
    pub message: Value,
}

/// Startup sequence a detached overlay plays to itself.
///
/// `server_time_ms` is the wall-clock timestamp reported as `serverTime`.
pub fn mock_events(server_time_ms: u64) -> Vec<MockEvent> {
    vec![
        MockEvent {
            delay: Duration::ZERO,
            message: json!({ "type": events::UI, "status": true }),
        },
        MockEvent {
            delay: Duration::ZERO,
            message: json!({
                "type": events::COMPONENT,
                "componentId": panels::MAIN,
                "action": "show",
                "data": { "title": "Main Interface" },
            }),
        },
        MockEvent {
            delay: Duration::from_secs(1),
            message: json!({
                "type": events::SERVER_DATA,
                "serverTime": server_time_ms,
                "playerName": "Development User",
                "playerId": 1,
                "playerCount": 32,
            }),
        },
    ]
}
