//! Host events that drive the registry
//!
//! Three inbound event types mutate panels: the legacy `ui` visibility toggle,
//! the legacy `serverData` push, and the generic `component` message.

use std::cell::RefCell;
use std::rc::Rc;

use lifeline_types::{ComponentAction, ComponentMessage, UiMessage, events};
use serde_json::Value;

use super::{PanelChange, PanelRegistry};
use crate::bridge::{Dispatcher, ProtocolError, Subscription};

/// Registry shared between the event binding and the views
pub type SharedRegistry = Rc<RefCell<PanelRegistry>>;

/// A decoded registry mutation
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    LegacyVisibility(bool),
    LegacyData(Value),
    Component {
        id: String,
        action: ComponentAction,
        data: Option<Value>,
    },
}

impl RegistryEvent {
    pub fn from_ui(payload: &Value) -> Result<Self, ProtocolError> {
        let message: UiMessage =
            serde_json::from_value(payload.clone()).map_err(|source| ProtocolError::Malformed {
                event: events::UI,
                source,
            })?;
        Ok(Self::LegacyVisibility(message.status))
    }

    pub fn from_server_data(payload: &Value) -> Self {
        Self::LegacyData(payload.clone())
    }

    pub fn from_component(payload: &Value) -> Result<Self, ProtocolError> {
        let message: ComponentMessage = serde_json::from_value(payload.clone()).map_err(
            |source| ProtocolError::Malformed {
                event: events::COMPONENT,
                source,
            },
        )?;

        let id = message
            .component_id
            .filter(|id| !id.is_empty())
            .ok_or(ProtocolError::MissingComponentId)?;

        let action =
            ComponentAction::parse(&message.action).ok_or_else(|| ProtocolError::UnknownAction {
                component_id: id.clone(),
                action: message.action.clone(),
            })?;

        Ok(Self::Component {
            id,
            action,
            data: message.data,
        })
    }
}

/// Subscriptions that feed host events into a [`SharedRegistry`].
///
/// Dropping the binding unsubscribes all three handlers.
#[derive(Debug)]
pub struct RegistryBinding {
    subscriptions: Vec<Subscription>,
}

impl RegistryBinding {
    /// Subscribe the registry to `ui`, `serverData` and `component` events.
    ///
    /// `on_change` runs after each applied mutation, with the registry borrow
    /// already released, so it may read the registry.
    pub fn attach(
        dispatcher: &Dispatcher,
        registry: SharedRegistry,
        on_change: impl Fn(&PanelChange) + 'static,
    ) -> Self {
        let on_change: Rc<dyn Fn(&PanelChange)> = Rc::new(on_change);

        let bind = |event_type: &'static str, decode: fn(&Value) -> Result<RegistryEvent, ProtocolError>| {
            let registry = Rc::clone(&registry);
            let on_change = Rc::clone(&on_change);
            dispatcher.subscribe(event_type, move |payload| {
                let event = match decode(payload) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(event_type, error = %err, "dropping malformed panel event");
                        return;
                    }
                };
                let change = match registry.try_borrow_mut() {
                    Ok(mut registry) => registry.apply(&event),
                    Err(_) => {
                        tracing::warn!(event_type, "registry busy, dropping panel event");
                        return;
                    }
                };
                tracing::debug!(panel = %change.id, kind = ?change.kind, "panel event applied");
                on_change(&change);
            })
        };

        let subscriptions = vec![
            bind(events::UI, RegistryEvent::from_ui),
            bind(events::SERVER_DATA, |payload| {
                Ok(RegistryEvent::from_server_data(payload))
            }),
            bind(events::COMPONENT, RegistryEvent::from_component),
        ];

        Self { subscriptions }
    }

    /// Keep the handlers registered for the lifetime of the dispatcher
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.detach();
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscriptions.iter().all(Subscription::is_active)
    }
}
