//! Main interface driven by the legacy `ui` and `serverData` events

use dioxus::prelude::*;
use lifeline_types::{OutboundRequest, actions, panels};
use serde_json::Value;

use crate::app::use_overlay;

const DEFAULT_TITLE: &str = "Lifeline";

fn text(data: Option<&Value>, key: &str) -> Option<String> {
    let value = data?.get(key)?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[component]
pub fn MainPanel() -> Element {
    let overlay = use_overlay();
    let _revision = *overlay.revision.read();

    let (title, player, count) = {
        let registry = overlay.registry.borrow();
        if !registry.legacy_visible() {
            return rsx! {};
        }
        let server = registry.legacy_server_data();
        (
            text(registry.data(panels::MAIN), "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            text(server, "playerName"),
            text(server, "playerCount"),
        )
    };

    rsx! {
        div { class: "main-ui",
            div { class: "container",
                h2 { "{title}" }
                if let Some(player) = player {
                    p { class: "server-line", "Player: {player}" }
                }
                if let Some(count) = count {
                    p { class: "server-line", "Players online: {count}" }
                }
                div { class: "buttons",
                    button {
                        class: "add-btn",
                        onclick: {
                            let overlay = overlay.clone();
                            move |_| overlay.send(OutboundRequest::empty(actions::GET_SERVER_DATA))
                        },
                        "Refresh"
                    }
                    button {
                        class: "close-btn",
                        onclick: {
                            let overlay = overlay.clone();
                            move |_| {
                                overlay.registry.borrow_mut().hide(panels::MAIN);
                                overlay.send(OutboundRequest::empty(actions::CLOSE));
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
