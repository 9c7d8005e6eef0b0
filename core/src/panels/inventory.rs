//! Inventory view model
//!
//! Panel data `{items: [{id, name, quantity}], cash}`. Hosts are loose about
//! this shape, so parsing degrades entry by entry instead of failing whole.

use lifeline_types::{CloseComponent, OutboundRequest, actions, panels};
use serde_json::Value;

use crate::registry::PanelRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub items: Vec<InventoryItem>,
    pub cash: u64,
}

/// Ids arrive as either strings or numbers
fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative count; floats are floored, negatives clamp to zero
fn count_of(value: Option<&Value>) -> u64 {
    let Some(value) = value else { return 0 };
    if let Some(n) = value.as_u64() {
        return n;
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f > 0.0)
        .map_or(0, |f| f.floor() as u64)
}

fn item_of(value: &Value) -> Option<InventoryItem> {
    let id = value.get("id").and_then(id_of)?;
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| id.clone(), str::to_string);
    Some(InventoryItem {
        quantity: count_of(value.get("quantity")),
        id,
        name,
    })
}

impl Inventory {
    pub fn from_data(data: Option<&Value>) -> Self {
        let Some(data) = data else {
            return Self::default();
        };
        let items = data
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(item_of).collect())
            .unwrap_or_default();
        Self {
            items,
            cash: count_of(data.get("cash")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hide the panel locally and produce `close {component: "inventory"}`
    pub fn close(registry: &mut PanelRegistry) -> OutboundRequest {
        registry.hide(panels::INVENTORY);
        let payload = serde_json::to_value(CloseComponent {
            component: panels::INVENTORY.to_string(),
        })
        .unwrap_or_default();
        OutboundRequest::new(actions::CLOSE, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_well_formed_data() {
        let data = json!({
            "items": [{"id": "apple", "name": "Apple", "quantity": 3}],
            "cash": 250
        });
        let inventory = Inventory::from_data(Some(&data));
        assert_eq!(
            inventory.items,
            vec![InventoryItem {
                id: "apple".to_string(),
                name: "Apple".to_string(),
                quantity: 3
            }]
        );
        assert_eq!(inventory.cash, 250);
    }

    #[test]
    fn tolerates_loose_shapes() {
        let data = json!({
            "items": [
                {"id": 7, "quantity": 2.9},
                {"name": "no id"},
                "garbage",
                {"id": "bandage", "name": "Bandage", "quantity": -4}
            ],
            "cash": "lots"
        });
        let inventory = Inventory::from_data(Some(&data));
        assert_eq!(inventory.items.len(), 2);
        assert_eq!(inventory.items[0].id, "7");
        assert_eq!(inventory.items[0].name, "7");
        assert_eq!(inventory.items[0].quantity, 2);
        assert_eq!(inventory.items[1].quantity, 0);
        assert_eq!(inventory.cash, 0);
    }

    #[test]
    fn repeated_ids_stay_separate_rows() {
        let data = json!({
            "items": [
                {"id": 1, "name": "Bandage", "quantity": 2},
                {"id": 1, "name": "Bandage", "quantity": 5}
            ]
        });
        let inventory = Inventory::from_data(Some(&data));
        let quantities: Vec<u64> = inventory.items.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![2, 5]);
    }

    #[test]
    fn missing_data_is_empty() {
        assert!(Inventory::from_data(None).is_empty());
        assert!(Inventory::from_data(Some(&json!({"items": {}}))).is_empty());
    }

    #[test]
    fn close_hides_and_requests() {
        let mut registry = PanelRegistry::new();
        registry.show(panels::INVENTORY, None);

        let request = Inventory::close(&mut registry);
        assert_eq!(request.action, "close");
        assert_eq!(request.payload, json!({"component": "inventory"}));
        assert!(!registry.is_visible(panels::INVENTORY));
    }
}
