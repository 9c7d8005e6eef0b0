//! Injury list editor
//!
//! A bounded, ordered list of free-text injuries seeded from panel data
//! `{injuries: [string], readOnly?: bool}`. Edits are local until submitted.

use lifeline_types::{InjuryLimits, InjurySubmission, OutboundRequest, actions, panels};
use serde_json::Value;

use crate::registry::PanelRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injury {
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct InjuryList {
    entries: Vec<Injury>,
    read_only: bool,
    limits: InjuryLimits,
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

impl InjuryList {
    pub fn new(limits: InjuryLimits) -> Self {
        Self {
            entries: Vec::new(),
            read_only: false,
            limits,
        }
    }

    pub fn from_data(data: Option<&Value>, limits: InjuryLimits) -> Self {
        let mut list = Self::new(limits);
        list.load(data);
        list
    }

    /// Reload from panel data.
    ///
    /// The entry list is replaced only when `injuries` is an array; other
    /// shapes keep the current entries. Non-string entries are skipped.
    pub fn load(&mut self, data: Option<&Value>) {
        self.read_only = data
            .and_then(|d| d.get("readOnly"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let Some(items) = data.and_then(|d| d.get("injuries")).and_then(Value::as_array) else {
            return;
        };
        self.entries = items
            .iter()
            .filter_map(Value::as_str)
            .take(self.limits.max_entries)
            .zip(1..)
            .map(|(text, id)| Injury {
                id,
                text: truncate(text, self.limits.max_text_len),
            })
            .collect();
    }

    pub fn entries(&self) -> &[Injury] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limits.max_entries
    }

    /// Append an empty entry; returns its id
    pub fn add(&mut self) -> Option<u32> {
        if self.read_only || self.is_full() {
            return None;
        }
        let id = self.entries.last().map_or(1, |last| last.id + 1);
        self.entries.push(Injury {
            id,
            text: String::new(),
        });
        Some(id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        if self.read_only {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|injury| injury.id != id);
        self.entries.len() != before
    }

    /// Replace an entry's text, truncated to the length limit
    pub fn update(&mut self, id: u32, text: &str) -> bool {
        if self.read_only {
            return false;
        }
        let max = self.limits.max_text_len;
        match self.entries.iter_mut().find(|injury| injury.id == id) {
            Some(injury) => {
                injury.text = truncate(text, max);
                true
            }
            None => false,
        }
    }

    pub fn submission(&self) -> InjurySubmission {
        InjurySubmission {
            injuries: self.entries.iter().map(|i| i.text.clone()).collect(),
        }
    }

    /// Hide the panel locally and produce the `submitInjuries` request.
    ///
    /// Read-only lists submit nothing and stay open.
    pub fn submit(&self, registry: &mut PanelRegistry) -> Option<OutboundRequest> {
        if self.read_only {
            return None;
        }
        let payload = serde_json::to_value(self.submission()).ok()?;
        registry.hide(panels::INJURIES);
        Some(OutboundRequest::new(actions::SUBMIT_INJURIES, payload))
    }
}
