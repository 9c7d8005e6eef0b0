//! Per-action cooldown countdowns
//!
//! Entries hold whole seconds remaining. An entry that reaches zero is
//! removed, so absence means "ready".

use std::collections::BTreeMap;
use std::time::Duration;

use hashbrown::HashMap;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooldownTable {
    remaining: HashMap<String, u32>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(seed: &BTreeMap<String, u32>) -> Self {
        let mut table = Self::new();
        for (action, secs) in seed {
            table.set(action, *secs);
        }
        table
    }

    /// Set `action`'s remaining seconds; zero clears the entry
    pub fn set(&mut self, action: &str, secs: u32) {
        if secs == 0 {
            self.remaining.remove(action);
        } else {
            self.remaining.insert(action.to_string(), secs);
        }
    }

    pub fn clear(&mut self, action: &str) {
        self.remaining.remove(action);
    }

    /// Seconds left for `action`, zero when ready
    pub fn remaining(&self, action: &str) -> u32 {
        self.remaining.get(action).copied().unwrap_or(0)
    }

    pub fn is_cooling(&self, action: &str) -> bool {
        self.remaining.contains_key(action)
    }

    /// One second elapsed: decrement every entry.
    ///
    /// Returns the actions that became ready, sorted.
    pub fn tick(&mut self) -> Vec<String> {
        let mut ready = Vec::new();
        self.remaining.retain(|action, secs| {
            *secs -= 1;
            if *secs == 0 {
                ready.push(action.clone());
                false
            } else {
                true
            }
        });
        ready.sort_unstable();
        ready
    }

    /// Entries sorted by action name
    pub fn entries(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .remaining
            .iter()
            .map(|(action, secs)| (action.as_str(), *secs))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Converts clock readings into whole-second countdown steps.
///
/// Interval timers drift and may be throttled; counting seconds against the
/// clock keeps the countdown at one step per elapsed second.
#[derive(Debug, Clone, Copy)]
pub struct SecondTicker {
    anchor: Duration,
}

impl SecondTicker {
    pub fn starting_at(now: Duration) -> Self {
        Self { anchor: now }
    }

    /// Whole seconds elapsed since the last call; the remainder carries over
    pub fn due(&mut self, now: Duration) -> u32 {
        if now <= self.anchor {
            return 0;
        }
        let steps = ((now - self.anchor).as_millis() / SECOND.as_millis()) as u32;
        self.anchor += SECOND * steps;
        steps
    }
}
