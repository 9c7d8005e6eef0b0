//! Read-only inventory viewer

use dioxus::prelude::*;
use lifeline_core::Inventory;
use lifeline_types::panels;

use crate::app::use_overlay;

#[component]
pub fn InventoryPanel() -> Element {
    let overlay = use_overlay();
    let _revision = *overlay.revision.read();

    let inventory = {
        let registry = overlay.registry.borrow();
        if !registry.is_visible(panels::INVENTORY) {
            return rsx! {};
        }
        Inventory::from_data(registry.data(panels::INVENTORY))
    };

    rsx! {
        div { class: "inventory-ui",
            div { class: "container",
                div { class: "inventory-header",
                    h2 { "Inventory" }
                    span { class: "cash", "${inventory.cash}" }
                }
                if inventory.is_empty() {
                    p { class: "inventory-empty", "Your pockets are empty" }
                }
                ul { class: "inventory-list",
                    // Hosts may repeat ids, so rows are keyed by position
                    for (index, item) in inventory.items.iter().enumerate() {
                        li { key: "{index}", class: "inventory-item",
                            span { class: "item-name", "{item.name}" }
                            span { class: "item-quantity", "x{item.quantity}" }
                        }
                    }
                }
                div { class: "buttons",
                    button {
                        class: "close-btn",
                        onclick: {
                            let overlay = overlay.clone();
                            move |_| {
                                let request = Inventory::close(&mut overlay.registry.borrow_mut());
                                overlay.send(request);
                                overlay.refresh();
                            }
                        },
                        "Close"
                    }
                }
            }
        }
    }
}
