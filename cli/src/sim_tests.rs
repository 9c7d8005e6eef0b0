//! End-to-end replays through the simulator

use lifeline_types::{Environment, OverlayConfig};
use serde_json::json;

use crate::scenario::parse;
use crate::sim::Simulator;

const SHOW_DEATHSCREEN: &str = r#"{"at_ms": 0, "inbound": {"type": "component", "componentId": "deathscreen", "action": "show", "data": {}}}"#;

async fn replay(lines: &[&str], settle_ms: u64) -> crate::Report {
    let steps = parse(&lines.join("\n")).unwrap();
    let mut simulator = Simulator::new(OverlayConfig::default(), None);
    simulator.run(&steps, settle_ms).await
}

#[tokio::test]
async fn held_call_dispatches_once_and_cools_down() {
    let report = replay(
        &[
            SHOW_DEATHSCREEN,
            r#"{"at_ms": 100, "key_down": "e"}"#,
            r#"{"at_ms": 2700, "key_up": "e"}"#,
        ],
        0,
    )
    .await;

    assert_eq!(report.requests.len(), 1);
    let request = &report.requests[0];
    assert_eq!(request.at_ms, 2612);
    assert_eq!(request.url, "https://lifeline/deathscreenAction");
    assert_eq!(request.body, json!({"action": "call"}));

    assert_eq!(report.final_ms, 2700);
    assert_eq!(report.cooldowns.get("call"), Some(&50));
    assert_eq!(report.holding, None);
}

#[tokio::test]
async fn early_release_sends_nothing() {
    let report = replay(
        &[
            SHOW_DEATHSCREEN,
            r#"{"at_ms": 100, "key_down": "e"}"#,
            r#"{"at_ms": 1500, "key_up": "e"}"#,
        ],
        3000,
    )
    .await;

    assert!(report.requests.is_empty());
    assert_eq!(report.cooldowns.get("call"), None);
}

#[tokio::test]
async fn local_is_blocked_at_startup() {
    let report = replay(
        &[SHOW_DEATHSCREEN, r#"{"at_ms": 10, "key_down": "g"}"#],
        3000,
    )
    .await;

    assert!(report.requests.is_empty());
    assert_eq!(report.holding, None);
    assert_eq!(report.cooldowns.get("local"), Some(&297));
}

#[tokio::test]
async fn keys_are_ignored_while_the_screen_is_hidden() {
    let report = replay(&[r#"{"at_ms": 0, "key_down": "e"}"#], 3000).await;
    assert!(report.requests.is_empty());
}

#[tokio::test]
async fn hiding_the_screen_does_not_abort_the_hold() {
    let report = replay(
        &[
            SHOW_DEATHSCREEN,
            r#"{"at_ms": 0, "key_down": "e"}"#,
            r#"{"at_ms": 500, "inbound": {"type": "component", "componentId": "deathscreen", "action": "hide"}}"#,
        ],
        2500,
    )
    .await;

    assert_eq!(report.requests.len(), 1);
    let deathscreen = report.panels.iter().find(|p| p.id == "deathscreen").unwrap();
    assert!(!deathscreen.visible);
}

#[tokio::test]
async fn releasing_after_the_screen_hides_still_aborts() {
    let report = replay(
        &[
            SHOW_DEATHSCREEN,
            r#"{"at_ms": 0, "key_down": "e"}"#,
            r#"{"at_ms": 500, "inbound": {"type": "component", "componentId": "deathscreen", "action": "hide"}}"#,
            r#"{"at_ms": 1000, "key_up": "e"}"#,
        ],
        2000,
    )
    .await;

    assert_eq!(report.final_ms, 3000);
    assert!(report.requests.is_empty());
    assert_eq!(report.cooldowns.get("call"), None);
    assert_eq!(report.holding, None);
}

#[tokio::test]
async fn responded_sets_help_text_and_local_cooldown() {
    let report = replay(
        &[SHOW_DEATHSCREEN, r#"{"at_ms": 50, "inbound": {"type": "responded"}}"#],
        0,
    )
    .await;

    assert_eq!(report.help_text.as_deref(), Some("Help is on the way"));
    assert_eq!(report.cooldowns.get("local"), Some(&600));
}

#[tokio::test]
async fn legacy_events_and_notifications_reach_state() {
    let report = replay(
        &[
            r#"{"at_ms": 0, "inbound": {"type": "ui", "status": true}}"#,
            r#"{"at_ms": 0, "inbound": {"type": "serverData", "playerCount": 32}}"#,
            r#"{"at_ms": 0, "inbound": {"type": "component", "componentId": "notification", "action": "show", "data": {"message": "Revived"}}}"#,
            r#"{"at_ms": 0, "inbound": {"type": "component", "componentId": "notification", "action": "update", "data": {"message": "Short", "durationMs": 100}}}"#,
            r#"{"at_ms": 0, "inbound": {"type": "component", "componentId": "main", "action": "explode"}}"#,
        ],
        200,
    )
    .await;

    let main = report.panels.iter().find(|p| p.id == "main").unwrap();
    assert!(main.visible);
    let server = report.panels.iter().find(|p| p.id == "server").unwrap();
    assert!(!server.visible);
    assert_eq!(server.data, json!({"playerCount": 32}));
    assert_eq!(report.toasts, vec!["Revived".to_string()]);
}

#[tokio::test]
async fn development_fallback_still_records_requests() {
    let config = OverlayConfig {
        environment: Environment::Development,
        ..OverlayConfig::default()
    };
    let steps = parse(&[SHOW_DEATHSCREEN, r#"{"at_ms": 0, "key_down": "e"}"#].join("\n")).unwrap();
    let mut simulator = Simulator::new(config, Some("medic".to_string()));
    let report = simulator.run(&steps, 2600).await;

    assert_eq!(report.requests.len(), 1);
    assert_eq!(report.requests[0].url, "https://medic/deathscreenAction");
    assert!(report.render().contains("POST https://medic/deathscreenAction"));
}
