//! Tests for Bridge request and event routing

use std::cell::RefCell;
use std::rc::Rc;

use lifeline_types::{Environment, OverlayConfig};
use serde_json::{Value, json};

use super::*;

fn config(environment: Environment) -> OverlayConfig {
    OverlayConfig {
        environment,
        fallback_resource: "lifeline".to_string(),
        ..OverlayConfig::default()
    }
}

fn bridge(
    transport: LoopbackTransport,
    environment: Environment,
) -> Bridge<LoopbackTransport, FixedResource> {
    Bridge::new(
        transport,
        FixedResource("medic-nui".to_string()),
        &config(environment),
    )
}

#[tokio::test]
async fn send_posts_json_to_resource_url() {
    let transport = LoopbackTransport::responding(r#"{"ok":true}"#);
    let bridge = bridge(transport.clone(), Environment::Production);

    let response = bridge
        .send("deathscreenAction", &json!({"action": "call"}))
        .await
        .unwrap();

    assert_eq!(response, json!({"ok": true}));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://medic-nui/deathscreenAction");
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, json!({"action": "call"}));
}

#[tokio::test]
async fn detached_host_uses_placeholder_resource() {
    let transport = LoopbackTransport::default();
    let bridge = Bridge::new(transport.clone(), Detached, &config(Environment::Production));

    assert!(!bridge.is_attached());
    bridge.request_server_data().await.unwrap();
    assert_eq!(transport.requests()[0].url, "https://lifeline/getServerData");
    assert_eq!(transport.requests()[0].body, "{}");
}

#[tokio::test]
async fn development_failure_resolves_to_empty_object() {
    let bridge = bridge(LoopbackTransport::unreachable("connection refused"), Environment::Development);

    let response = bridge.close().await.unwrap();
    assert_eq!(response, json!({}));
}

#[tokio::test]
async fn production_failure_is_a_transport_error() {
    let bridge = bridge(LoopbackTransport::unreachable("connection refused"), Environment::Production);

    let err = bridge.close().await.unwrap_err();
    assert!(matches!(err, BridgeError::Transport { .. }));
    assert_eq!(err.action(), "close");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let bridge = bridge(LoopbackTransport::responding("<html>"), Environment::Production);

    let err = bridge.close_component("inventory").await.unwrap_err();
    assert!(matches!(err, BridgeError::Decode { .. }));
}

#[tokio::test]
async fn close_component_names_the_panel() {
    let transport = LoopbackTransport::default();
    let bridge = bridge(transport.clone(), Environment::Production);

    bridge.close_component("injuries").await.unwrap();
    let body: Value = serde_json::from_str(&transport.requests()[0].body).unwrap();
    assert_eq!(body, json!({"component": "injuries"}));
}

#[test]
fn deliver_strips_type_and_routes_by_it() {
    let bridge = bridge(LoopbackTransport::default(), Environment::Production);
    let seen: Rc<RefCell<Vec<Value>>> = Rc::default();

    let sink = Rc::clone(&seen);
    let _sub = bridge.subscribe("ui", move |payload| sink.borrow_mut().push(payload.clone()));

    let invoked = bridge.deliver(&json!({"type": "ui", "status": true})).unwrap();
    assert_eq!(invoked, 1);
    assert_eq!(*seen.borrow(), vec![json!({"status": true})]);
}

#[test]
fn deliver_rejects_messages_without_type() {
    let bridge = bridge(LoopbackTransport::default(), Environment::Production);

    assert!(matches!(
        bridge.deliver(&json!({"status": true})),
        Err(ProtocolError::MissingType)
    ));
    assert!(matches!(
        bridge.deliver(&json!([1, 2])),
        Err(ProtocolError::NotAnObject)
    ));
}

#[test]
fn deliver_json_drops_garbage() {
    let bridge = bridge(LoopbackTransport::default(), Environment::Production);
    let hits = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&hits);
    let _sub = bridge.subscribe("ui", move |_| *counter.borrow_mut() += 1);

    assert_eq!(bridge.deliver_json("not json"), 0);
    assert_eq!(bridge.deliver_json(r#"{"type":"unknown"}"#), 0);
    assert_eq!(bridge.deliver_json(r#"{"type":"ui","status":false}"#), 1);
    assert_eq!(*hits.borrow(), 1);
}
