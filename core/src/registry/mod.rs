//! Panel registry
//!
//! Tracks, per panel identifier, whether the panel is visible and the last
//! data the host (or a view) supplied for it. Panels are created on first
//! reference and live for the lifetime of the overlay.

mod events;


pub use events::{RegistryBinding, RegistryEvent, SharedRegistry};

use hashbrown::HashMap;
use lifeline_types::panels;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named, independently visible overlay surface
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: String,
    pub visible: bool,
    /// Host-defined payload; `Null` until data is supplied
    pub data: Value,
}

impl Panel {
    fn new(id: &str, visible: bool, data: Value) -> Self {
        Self {
            id: id.to_string(),
            visible,
            data,
        }
    }
}

/// What a registry mutation did, for views that re-render on change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Registered,
    Shown { data_replaced: bool },
    Hidden,
    DataUpdated,
    /// The call had no effect
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelChange {
    pub id: String,
    pub kind: ChangeKind,
}

impl PanelChange {
    fn new(id: &str, kind: ChangeKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
        }
    }

    /// True when the panel's data may differ from before the mutation
    pub fn touched_data(&self) -> bool {
        matches!(
            self.kind,
            ChangeKind::DataUpdated | ChangeKind::Shown { data_replaced: true }
        )
    }
}

/// Process-wide panel state, keyed by panel identifier
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: HashMap<String, Panel>,
    revision: u64,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hidden panel if `id` is unknown; existing panels are untouched
    pub fn register(&mut self, id: &str, initial_data: Option<Value>) -> PanelChange {
        if self.panels.contains_key(id) {
            return PanelChange::new(id, ChangeKind::Unchanged);
        }
        self.panels.insert(
            id.to_string(),
            Panel::new(id, false, initial_data.unwrap_or(Value::Null)),
        );
        self.bump();
        PanelChange::new(id, ChangeKind::Registered)
    }

    /// Make a panel visible, replacing its data only when `data` is given.
    ///
    /// Unknown panels are created visible.
    pub fn show(&mut self, id: &str, data: Option<Value>) -> PanelChange {
        let data_replaced = data.is_some();
        match self.panels.get_mut(id) {
            Some(panel) => {
                panel.visible = true;
                if let Some(data) = data {
                    panel.data = data;
                }
            }
            None => {
                self.panels.insert(
                    id.to_string(),
                    Panel::new(id, true, data.unwrap_or(Value::Null)),
                );
            }
        }
        self.bump();
        PanelChange::new(id, ChangeKind::Shown { data_replaced })
    }

    /// Hide a known panel, keeping its data. Unknown panels are ignored.
    pub fn hide(&mut self, id: &str) -> PanelChange {
        let Some(panel) = self.panels.get_mut(id) else {
            return PanelChange::new(id, ChangeKind::Unchanged);
        };
        panel.visible = false;
        self.bump();
        PanelChange::new(id, ChangeKind::Hidden)
    }

    /// Replace a panel's data without touching visibility.
    ///
    /// Unknown panels are created hidden.
    pub fn update_data(&mut self, id: &str, data: Value) -> PanelChange {
        match self.panels.get_mut(id) {
            Some(panel) => panel.data = data,
            None => {
                self.panels
                    .insert(id.to_string(), Panel::new(id, false, data));
            }
        }
        self.bump();
        PanelChange::new(id, ChangeKind::DataUpdated)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.panels.get(id).is_some_and(|p| p.visible)
    }

    /// Last data for `id`; `None` for unknown panels or `null` data
    pub fn data(&self, id: &str) -> Option<&Value> {
        self.panels.get(id).map(|p| &p.data).filter(|d| !d.is_null())
    }

    /// Decode a panel's data into `T`, falling back to `T::default()` when
    /// the payload is absent or does not have the expected shape
    pub fn data_as<T: DeserializeOwned + Default>(&self, id: &str) -> T {
        self.data(id)
            .and_then(|data| T::deserialize(data).ok())
            .unwrap_or_default()
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.get(id)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Incremented on every effective mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// State of the legacy single-panel protocol
    pub fn legacy_visible(&self) -> bool {
        self.is_visible(panels::MAIN)
    }

    pub fn legacy_server_data(&self) -> Option<&Value> {
        self.data(panels::SERVER)
    }

    /// Apply an inbound host event
    pub fn apply(&mut self, event: &RegistryEvent) -> PanelChange {
        use lifeline_types::ComponentAction;

        match event {
            RegistryEvent::LegacyVisibility(true) => self.show(panels::MAIN, None),
            RegistryEvent::LegacyVisibility(false) => self.hide(panels::MAIN),
            RegistryEvent::LegacyData(data) => self.update_data(panels::SERVER, data.clone()),
            RegistryEvent::Component { id, action, data } => match action {
                ComponentAction::Show => self.show(id, data.clone()),
                ComponentAction::Hide => self.hide(id),
                ComponentAction::Update => {
                    self.update_data(id, data.clone().unwrap_or(Value::Null))
                }
            },
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
