//! Hold-to-confirm state machine
//!
//! Per action: `Idle → Holding → (Idle | Cooldown) → Idle`.
//!
//! - At most one action is `Holding` across the whole engine
//! - A hold commits once its elapsed time reaches the configured duration;
//!   the action is dispatched exactly once and its cooldown starts
//! - Releasing early discards all progress
//! - Cooldowns count down one step per elapsed second, independent of holds

use std::collections::BTreeMap;
use std::time::Duration;

use lifeline_types::{DeathScreenActionPayload, HoldConfig, OutboundRequest};

use super::clock::Clock;
use super::cooldown::{CooldownTable, SecondTicker};
use super::error::HoldRejected;
use super::sink::ActionSink;

/// Observable state of one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Holding,
    Cooldown,
}

/// Snapshot of one action's hold bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct HoldAction {
    pub id: String,
    pub state: HoldState,
    /// Clock reading when the current hold began
    pub start_timestamp: Option<Duration>,
    pub remaining_cooldown_secs: u32,
}

/// Identifies one hold attempt.
///
/// Frame callbacks carry the ticket of the hold they were scheduled for; a
/// tick with a stale ticket is ignored, so a late callback cannot revive a
/// released or committed hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldTicket(u64);

/// Result of one frame tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Still holding; percent complete in `[0, 100)`
    Progress(f64),
    /// The hold reached its duration and was dispatched
    Completed { action: String },
    /// The ticket no longer refers to the active hold; stop ticking
    Stale,
}

impl TickOutcome {
    /// Whether the frame loop should schedule another tick
    pub fn keep_ticking(&self) -> bool {
        matches!(self, TickOutcome::Progress(_))
    }

    /// Progress to render for this frame; a completed hold renders full
    pub fn progress(&self) -> Option<f64> {
        match self {
            TickOutcome::Progress(percent) => Some(*percent),
            TickOutcome::Completed { .. } => Some(100.0),
            TickOutcome::Stale => None,
        }
    }
}

#[derive(Debug)]
struct ActiveHold {
    action: String,
    started_at: Duration,
    ticket: HoldTicket,
    progress: f64,
}

pub struct HoldCooldownEngine<C> {
    clock: C,
    hold_duration: Duration,
    dispatch_event: String,
    completion_cooldowns: BTreeMap<String, u32>,
    sink: Box<dyn ActionSink>,
    active: Option<ActiveHold>,
    cooldowns: CooldownTable,
    ticker: SecondTicker,
    next_ticket: u64,
}

impl<C: Clock> HoldCooldownEngine<C> {
    /// Build an engine seeded with `config.initial_cooldowns`
    pub fn new(clock: C, config: &HoldConfig, sink: impl ActionSink + 'static) -> Self {
        let ticker = SecondTicker::starting_at(clock.now());
        Self {
            clock,
            hold_duration: Duration::from_millis(config.duration_ms),
            dispatch_event: config.dispatch_event.clone(),
            completion_cooldowns: config.cooldowns.clone(),
            sink: Box::new(sink),
            active: None,
            cooldowns: CooldownTable::from_map(&config.initial_cooldowns),
            ticker,
            next_ticket: 0,
        }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// `Idle → Holding` for `action`.
    ///
    /// Rejected without any state change while another hold is active or
    /// while `action` is cooling down.
    pub fn begin_hold(&mut self, action: &str) -> Result<HoldTicket, HoldRejected> {
        if let Some(active) = &self.active {
            return Err(HoldRejected::AnotherHoldActive {
                active: active.action.clone(),
            });
        }
        let remaining = self.cooldowns.remaining(action);
        if remaining > 0 {
            return Err(HoldRejected::CoolingDown {
                action: action.to_string(),
                remaining_secs: remaining,
            });
        }

        let ticket = HoldTicket(self.next_ticket);
        self.next_ticket += 1;
        self.active = Some(ActiveHold {
            action: action.to_string(),
            started_at: self.clock.now(),
            ticket,
            progress: 0.0,
        });
        tracing::debug!(action, "hold started");
        Ok(ticket)
    }

    /// Abort the hold on `action` if it is the one being held
    pub fn release(&mut self, action: &str) -> bool {
        if self.holding() != Some(action) {
            return false;
        }
        self.active = None;
        tracing::debug!(action, "hold released early");
        true
    }

    /// Abort whichever hold is active, returning its action
    pub fn release_any(&mut self) -> Option<String> {
        let released = self.active.take().map(|hold| hold.action);
        if let Some(action) = &released {
            tracing::debug!(action = %action, "hold released early");
        }
        released
    }

    /// Frame tick: recompute progress and commit the hold when it is due
    pub fn tick(&mut self, ticket: HoldTicket) -> TickOutcome {
        let now = self.clock.now();
        let duration = self.hold_duration;
        let Some(active) = self.active.as_mut().filter(|a| a.ticket == ticket) else {
            return TickOutcome::Stale;
        };

        let elapsed = now.saturating_sub(active.started_at);
        let percent = progress_percent(elapsed, duration);
        active.progress = active.progress.max(percent);

        if elapsed < duration {
            return TickOutcome::Progress(active.progress);
        }

        let action = active.action.clone();
        self.commit(&action);
        TickOutcome::Completed { action }
    }

    fn commit(&mut self, action: &str) {
        self.active = None;

        let payload = serde_json::to_value(DeathScreenActionPayload {
            action: action.to_string(),
        })
        .unwrap_or_default();
        self.sink
            .dispatch(OutboundRequest::new(self.dispatch_event.clone(), payload));

        let cooldown = self.completion_cooldowns.get(action).copied().unwrap_or(0);
        self.cooldowns.set(action, cooldown);
        tracing::info!(action, cooldown_secs = cooldown, "hold committed");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cooldowns
    // ─────────────────────────────────────────────────────────────────────────

    /// One second elapsed; returns actions that became ready
    pub fn tick_cooldowns(&mut self) -> Vec<String> {
        let ready = self.cooldowns.tick();
        for action in &ready {
            tracing::debug!(action = %action, "cooldown elapsed");
        }
        ready
    }

    /// Apply one countdown step per whole second elapsed on the clock since
    /// the previous call
    pub fn advance_cooldowns(&mut self) -> Vec<String> {
        let steps = self.ticker.due(self.clock.now());
        let mut ready = Vec::new();
        for _ in 0..steps {
            ready.extend(self.tick_cooldowns());
        }
        ready
    }

    /// Override `action`'s remaining cooldown; zero makes it ready
    pub fn set_cooldown(&mut self, action: &str, secs: u32) {
        self.cooldowns.set(action, secs);
    }

    pub fn apply_cooldowns(&mut self, cooldowns: &BTreeMap<String, u32>) {
        for (action, secs) in cooldowns {
            self.set_cooldown(action, *secs);
        }
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    pub fn remaining_cooldown(&self, action: &str) -> u32 {
        self.cooldowns.remaining(action)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Action currently being held
    pub fn holding(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.action.as_str())
    }

    pub fn is_holding(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_ticket(&self) -> Option<HoldTicket> {
        self.active.as_ref().map(|a| a.ticket)
    }

    /// Progress of the active hold as of its last tick, 0 when idle
    pub fn progress(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |a| a.progress)
    }

    /// Progress for `action`, 0 unless it is the one being held
    pub fn progress_for(&self, action: &str) -> f64 {
        match &self.active {
            Some(active) if active.action == action => active.progress,
            _ => 0.0,
        }
    }

    pub fn can_begin(&self, action: &str) -> bool {
        self.active.is_none() && !self.cooldowns.is_cooling(action)
    }

    pub fn state(&self, action: &str) -> HoldState {
        if self.holding() == Some(action) {
            HoldState::Holding
        } else if self.cooldowns.is_cooling(action) {
            HoldState::Cooldown
        } else {
            HoldState::Idle
        }
    }

    pub fn action(&self, id: &str) -> HoldAction {
        let start_timestamp = self
            .active
            .as_ref()
            .filter(|a| a.action == id)
            .map(|a| a.started_at);
        HoldAction {
            id: id.to_string(),
            state: self.state(id),
            start_timestamp,
            remaining_cooldown_secs: self.cooldowns.remaining(id),
        }
    }
}

/// `min(100, 100 * elapsed / duration)`
fn progress_percent(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 100.0;
    }
    (100.0 * elapsed.as_secs_f64() / duration.as_secs_f64()).min(100.0)
}
