//! Incapacitation screen with hold-to-confirm buttons

use dioxus::prelude::*;
use lifeline_types::{DeathScreenData, panels};

use crate::app::use_overlay;

#[component]
pub fn DeathScreenPanel() -> Element {
    let overlay = use_overlay();
    let _revision = *overlay.revision.read();

    let (visible, data) = {
        let registry = overlay.registry.borrow();
        (
            registry.is_visible(panels::DEATHSCREEN),
            registry.data_as::<DeathScreenData>(panels::DEATHSCREEN),
        )
    };
    if !visible {
        return rsx! {};
    }

    let (buttons, help_text) = {
        let deathscreen = overlay.deathscreen.borrow();
        let engine = overlay.engine.borrow();
        (
            deathscreen.buttons(&engine, &data),
            deathscreen.help_text().map(str::to_string),
        )
    };

    rsx! {
        div { class: "deathscreen-ui",
            if let Some(text) = help_text {
                div { class: "help-text", "{text}" }
            }
            h1 { class: "death-title", "You are incapacitated" }
            div { class: "buttons-container",
                for button in buttons {
                    button {
                        key: "{button.action}",
                        class: if button.disabled { "death-btn disabled" } else { "death-btn" },
                        disabled: button.disabled,
                        onmousedown: {
                            let overlay = overlay.clone();
                            let action = button.action;
                            move |_| overlay.press(action)
                        },
                        onmouseup: {
                            let overlay = overlay.clone();
                            move |_| overlay.lift()
                        },
                        onmouseleave: {
                            let overlay = overlay.clone();
                            move |_| overlay.lift()
                        },
                        span { class: "btn-label", "{button.label}" }
                        if let Some(progress) = button.progress {
                            div { class: "progress-bar", style: "width: {progress}%" }
                        }
                    }
                }
            }
        }
    }
}
