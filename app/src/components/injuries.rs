//! Injury list editor

use dioxus::prelude::*;
use lifeline_types::panels;

use crate::app::use_overlay;

#[component]
pub fn InjuriesPanel() -> Element {
    let overlay = use_overlay();
    let _revision = *overlay.revision.read();

    if !overlay.registry.borrow().is_visible(panels::INJURIES) {
        return rsx! {};
    }

    let (entries, read_only, full) = {
        let list = overlay.injuries.borrow();
        (list.entries().to_vec(), list.is_read_only(), list.is_full())
    };

    let close = {
        let overlay = overlay.clone();
        move |_: MouseEvent| {
            overlay.registry.borrow_mut().hide(panels::INJURIES);
            overlay.refresh();
        }
    };

    rsx! {
        div { class: "injuries-ui",
            div { class: "container",
                h2 { "Injuries" }
                div { class: "injuries-list",
                    for injury in entries {
                        div { key: "{injury.id}", class: "injury-row",
                            input {
                                r#type: "text",
                                value: "{injury.text}",
                                placeholder: "Describe injury",
                                readonly: read_only,
                                oninput: {
                                    let overlay = overlay.clone();
                                    let id = injury.id;
                                    move |e: FormEvent| {
                                        if overlay.injuries.borrow_mut().update(id, &e.value()) {
                                            overlay.refresh();
                                        }
                                    }
                                },
                            }
                            if !read_only {
                                button {
                                    class: "delete-btn",
                                    onclick: {
                                        let overlay = overlay.clone();
                                        let id = injury.id;
                                        move |_| {
                                            if overlay.injuries.borrow_mut().remove(id) {
                                                overlay.refresh();
                                            }
                                        }
                                    },
                                    "X"
                                }
                            }
                        }
                    }
                }
                if read_only {
                    div { class: "buttons",
                        button { class: "close-btn", onclick: close.clone(), "Close" }
                    }
                } else {
                    div { class: "buttons",
                        button {
                            class: "add-btn",
                            disabled: full,
                            onclick: {
                                let overlay = overlay.clone();
                                move |_| {
                                    if overlay.injuries.borrow_mut().add().is_some() {
                                        overlay.refresh();
                                    }
                                }
                            },
                            "Add Injury"
                        }
                        div { class: "right-buttons",
                            button {
                                class: "submit-btn",
                                onclick: {
                                    let overlay = overlay.clone();
                                    move |_| {
                                        let request = {
                                            let list = overlay.injuries.borrow();
                                            list.submit(&mut overlay.registry.borrow_mut())
                                        };
                                        if let Some(request) = request {
                                            overlay.send(request);
                                        }
                                        overlay.refresh();
                                    }
                                },
                                "Submit"
                            }
                            button { class: "close-btn", onclick: close, "Close" }
                        }
                    }
                }
            }
        }
    }
}
