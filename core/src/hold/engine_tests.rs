//! Tests for HoldCooldownEngine timing, cancellation and mutual exclusion

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lifeline_types::{Environment, HoldConfig, OverlayConfig};
use serde_json::{Value, json};

use super::*;
use crate::bridge::{Bridge, Detached, LoopbackTransport};

fn config() -> HoldConfig {
    HoldConfig {
        initial_cooldowns: BTreeMap::new(),
        ..HoldConfig::default()
    }
}

fn engine() -> (HoldCooldownEngine<ManualClock>, ManualClock, Outbox) {
    let clock = ManualClock::new();
    let outbox = Outbox::new();
    let engine = HoldCooldownEngine::new(clock.clone(), &config(), outbox.clone());
    (engine, clock, outbox)
}

#[test]
fn progress_starts_at_zero() {
    let (mut engine, _clock, _outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();

    assert_eq!(engine.tick(ticket), TickOutcome::Progress(0.0));
    assert_eq!(engine.state("call"), HoldState::Holding);
}

#[test]
fn progress_is_strictly_between_and_non_decreasing() {
    let (mut engine, clock, outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();

    let mut last = 0.0;
    for _ in 0..155 {
        clock.advance_ms(16);
        match engine.tick(ticket) {
            TickOutcome::Progress(percent) => {
                assert!(percent > 0.0 && percent < 100.0, "got {percent}");
                assert!(percent >= last);
                last = percent;
            }
            other => panic!("hold finished early: {other:?}"),
        }
    }
    assert!(outbox.is_empty());
    assert!((engine.progress() - last).abs() < f64::EPSILON);
}

#[test]
fn completes_exactly_once_at_duration() {
    let (mut engine, clock, outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();

    clock.advance_ms(1250);
    assert_eq!(engine.tick(ticket), TickOutcome::Progress(50.0));

    clock.advance_ms(1250);
    let outcome = engine.tick(ticket);
    assert_eq!(
        outcome,
        TickOutcome::Completed {
            action: "call".to_string()
        }
    );
    assert_eq!(outcome.progress(), Some(100.0));
    assert!(!outcome.keep_ticking());

    // A late frame for the same hold does nothing
    clock.advance_ms(16);
    assert_eq!(engine.tick(ticket), TickOutcome::Stale);

    let sent = outbox.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, "deathscreenAction");
    assert_eq!(sent[0].payload, json!({"action": "call"}));
    assert_eq!(engine.remaining_cooldown("call"), 50);
    assert_eq!(engine.state("call"), HoldState::Cooldown);
    assert!(!engine.is_holding());
}

#[test]
fn late_first_tick_still_commits() {
    let (mut engine, clock, outbox) = engine();
    let ticket = engine.begin_hold("local").unwrap();

    clock.advance_ms(4000);
    assert!(matches!(engine.tick(ticket), TickOutcome::Completed { .. }));
    assert_eq!(outbox.len(), 1);
    assert_eq!(engine.remaining_cooldown("local"), 300);
}

#[test]
fn early_release_dispatches_nothing_and_resets() {
    let (mut engine, clock, outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();

    clock.advance_ms(2000);
    engine.tick(ticket);
    assert!(engine.progress() > 0.0);

    assert!(engine.release("call"));
    assert_eq!(engine.progress(), 0.0);
    assert_eq!(engine.state("call"), HoldState::Idle);

    clock.advance_ms(1000);
    assert_eq!(engine.tick(ticket), TickOutcome::Stale);
    assert!(outbox.is_empty());
    assert!(engine.cooldowns().is_empty());
}

#[test]
fn fresh_hold_gets_its_own_timer() {
    let (mut engine, clock, outbox) = engine();
    let first = engine.begin_hold("call").unwrap();
    clock.advance_ms(2000);
    engine.tick(first);
    engine.release("call");

    let second = engine.begin_hold("call").unwrap();
    assert_ne!(first, second);
    assert_eq!(engine.tick(second), TickOutcome::Progress(0.0));

    clock.advance_ms(2000);
    assert!(engine.tick(second).keep_ticking());
    clock.advance_ms(500);
    assert!(matches!(engine.tick(second), TickOutcome::Completed { .. }));
    assert_eq!(outbox.len(), 1);
}

#[test]
fn release_of_other_action_is_ignored() {
    let (mut engine, _clock, _outbox) = engine();
    engine.begin_hold("call").unwrap();

    assert!(!engine.release("local"));
    assert_eq!(engine.holding(), Some("call"));
    assert_eq!(engine.release_any(), Some("call".to_string()));
    assert_eq!(engine.release_any(), None);
}

#[test]
fn second_hold_is_rejected_while_one_is_active() {
    let (mut engine, clock, _outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();
    clock.advance_ms(1000);
    engine.tick(ticket);
    let before = engine.action("call");

    let err = engine.begin_hold("local").unwrap_err();
    assert_eq!(
        err,
        HoldRejected::AnotherHoldActive {
            active: "call".to_string()
        }
    );
    assert!(engine.begin_hold("call").is_err());

    assert_eq!(engine.action("call"), before);
    assert_eq!(engine.state("local"), HoldState::Idle);
    assert_eq!(engine.active_ticket(), Some(ticket));
}

#[test]
fn hold_is_rejected_during_cooldown_until_it_reaches_zero() {
    let (mut engine, clock, _outbox) = engine();
    let ticket = engine.begin_hold("call").unwrap();
    clock.advance_ms(2500);
    engine.tick(ticket);

    for remaining in (1..=50).rev() {
        assert_eq!(engine.remaining_cooldown("call"), remaining);
        assert_eq!(
            engine.begin_hold("call"),
            Err(HoldRejected::CoolingDown {
                action: "call".to_string(),
                remaining_secs: remaining
            })
        );
        engine.tick_cooldowns();
    }

    assert_eq!(engine.state("call"), HoldState::Idle);
    assert!(engine.can_begin("call"));
    assert!(engine.begin_hold("call").is_ok());
}

#[test]
fn cooldowns_run_while_another_action_is_held() {
    let (mut engine, _clock, _outbox) = engine();
    engine.set_cooldown("local", 2);
    engine.begin_hold("call").unwrap();

    assert!(engine.tick_cooldowns().is_empty());
    assert_eq!(engine.tick_cooldowns(), vec!["local".to_string()]);
    assert_eq!(engine.holding(), Some("call"));
}

#[test]
fn advance_cooldowns_follows_the_clock() {
    let (mut engine, clock, _outbox) = engine();
    engine.set_cooldown("call", 3);

    clock.advance_ms(900);
    assert!(engine.advance_cooldowns().is_empty());
    assert_eq!(engine.remaining_cooldown("call"), 3);

    clock.advance_ms(1200);
    engine.advance_cooldowns();
    assert_eq!(engine.remaining_cooldown("call"), 1);

    clock.advance_ms(5000);
    assert_eq!(engine.advance_cooldowns(), vec!["call".to_string()]);
    assert!(engine.cooldowns().is_empty());
}

#[test]
fn initial_cooldowns_block_at_startup() {
    let clock = ManualClock::new();
    let mut engine = HoldCooldownEngine::new(clock, &HoldConfig::default(), Outbox::new());

    assert_eq!(engine.remaining_cooldown("local"), 300);
    assert!(matches!(
        engine.begin_hold("local"),
        Err(HoldRejected::CoolingDown { .. })
    ));
    assert!(engine.begin_hold("call").is_ok());
}

#[test]
fn responder_override_replaces_remaining_time() {
    let (mut engine, _clock, _outbox) = engine();
    engine.set_cooldown("local", 12);
    engine.apply_cooldowns(&BTreeMap::from([("local".to_string(), 600)]));
    assert_eq!(engine.remaining_cooldown("local"), 600);

    engine.set_cooldown("local", 0);
    assert_eq!(engine.state("local"), HoldState::Idle);
}

#[test]
fn unconfigured_action_has_no_cooldown() {
    let (mut engine, clock, outbox) = engine();
    let ticket = engine.begin_hold("wave").unwrap();
    clock.advance_ms(2500);
    engine.tick(ticket);

    assert_eq!(outbox.len(), 1);
    assert!(engine.can_begin("wave"));
}

#[test]
fn action_snapshot_reports_start_time() {
    let (mut engine, clock, _outbox) = engine();
    clock.advance_ms(700);
    engine.begin_hold("call").unwrap();

    let snapshot = engine.action("call");
    assert_eq!(snapshot.state, HoldState::Holding);
    assert_eq!(snapshot.start_timestamp, Some(std::time::Duration::from_millis(700)));
    assert_eq!(engine.action("local").start_timestamp, None);
}

#[tokio::test]
async fn failed_dispatch_keeps_the_cooldown() {
    let overlay = OverlayConfig {
        environment: Environment::Production,
        ..OverlayConfig::default()
    };
    let transport = LoopbackTransport::unreachable("host gone");
    let bridge = Rc::new(Bridge::new(transport.clone(), Detached, &overlay));

    let tasks: Rc<RefCell<Vec<LocalTask>>> = Rc::default();
    let spawned = Rc::clone(&tasks);
    let failures: Rc<RefCell<Vec<String>>> = Rc::default();
    let reported = Rc::clone(&failures);
    let sink = BridgeSink::new(bridge, move |task| spawned.borrow_mut().push(task))
        .on_error(move |err| reported.borrow_mut().push(err.action().to_string()));

    let clock = ManualClock::new();
    let mut engine = HoldCooldownEngine::new(clock.clone(), &config(), sink);
    let ticket = engine.begin_hold("call").unwrap();
    clock.advance_ms(2500);
    engine.tick(ticket);

    let pending: Vec<LocalTask> = tasks.borrow_mut().drain(..).collect();
    assert_eq!(pending.len(), 1);
    for task in pending {
        task.await;
    }

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://lifeline/deathscreenAction");
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, json!({"action": "call"}));
    assert_eq!(engine.remaining_cooldown("call"), 50);
    assert_eq!(*failures.borrow(), vec!["deathscreenAction".to_string()]);
}
