//! Hold-to-confirm actions with per-action cooldowns
//!
//! This module provides:
//! - **Engine**: the `Idle → Holding → Cooldown → Idle` state machine
//! - **Cooldowns**: whole-second countdown table
//! - **Clock**: monotonic time source (manual clock for replay and tests)
//! - **Sinks**: where committed actions are handed off for dispatch
//!
//! # Tick sources
//!
//! The engine does not schedule anything itself. The host UI drives it with:
//! - a frame-paced `tick(ticket)` while a hold is active
//! - a one-second `advance_cooldowns()` for the lifetime of the overlay

mod clock;
mod cooldown;
mod engine;
mod error;
mod sink;

#[cfg(test)]
mod engine_tests;

pub use clock::{Clock, ManualClock};
pub use cooldown::{CooldownTable, SecondTicker};
pub use engine::{HoldAction, HoldCooldownEngine, HoldState, HoldTicket, TickOutcome};
pub use error::HoldRejected;
pub use sink::{ActionSink, BridgeSink, LocalTask, Outbox};
