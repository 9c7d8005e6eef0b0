//! Toast notification frame
//!
//! Renders the shared notification queue. Toasts arrive from the
//! `notification` panel and from failed host requests; expiry runs on the
//! sweep loop in `App`.

use dioxus::prelude::*;
use lifeline_types::ToastSeverity;

use crate::app::use_overlay;

/// Toast container component - renders all active toasts.
///
/// Place this once at the end of your main layout.
#[component]
pub fn ToastFrame() -> Element {
    let overlay = use_overlay();
    let _revision = *overlay.revision.read();
    let toasts: Vec<_> = overlay.toasts.borrow().toasts().cloned().collect();

    rsx! {
        div { class: "toast-container",
            for toast in toasts {
                div {
                    key: "{toast.id}",
                    class: match toast.severity {
                        ToastSeverity::Normal => "toast",
                        ToastSeverity::Critical => "toast toast-critical",
                    },
                    span { class: "toast-icon", "!" }
                    span { class: "toast-message", "{toast.message}" }
                    button {
                        class: "toast-close",
                        onclick: {
                            let overlay = overlay.clone();
                            let id = toast.id;
                            move |_| {
                                if overlay.toasts.borrow_mut().dismiss(id) {
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
}
