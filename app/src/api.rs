//! Host API module
//!
//! Browser-side seams the core crate abstracts over: the resource name
//! accessor injected by the host, the window `message` channel, keyboard
//! listeners, a monotonic clock and local task spawning.

use std::rc::Rc;
use std::time::Duration;

use lifeline_core::{Clock, HostEnvironment, LocalTask};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Host Environment
// ─────────────────────────────────────────────────────────────────────────────

/// Reads the resource name through the host-injected
/// `window.GetParentResourceName`
#[derive(Debug, Clone, Copy, Default)]
pub struct NuiHost;

impl HostEnvironment for NuiHost {
    fn resource_name(&self) -> Option<String> {
        let window = web_sys::window()?;
        let accessor =
            js_sys::Reflect::get(&window, &JsValue::from_str("GetParentResourceName")).ok()?;
        let accessor = accessor.dyn_into::<js_sys::Function>().ok()?;
        accessor
            .call0(&JsValue::NULL)
            .ok()?
            .as_string()
            .filter(|name| !name.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Time
// ─────────────────────────────────────────────────────────────────────────────

/// `performance.now()` clock, falling back to `Date.now()`
#[derive(Debug, Clone)]
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let ms = self
            .performance
            .as_ref()
            .map_or_else(js_sys::Date::now, |p| p.now());
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}

/// Wall-clock milliseconds since the epoch
pub fn epoch_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Spawner handed to the hold engine's bridge sink
pub fn spawn_task(task: LocalTask) {
    wasm_bindgen_futures::spawn_local(task);
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Listeners
// ─────────────────────────────────────────────────────────────────────────────

/// A `window` event listener, removed on drop
pub struct WindowListener {
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl WindowListener {
    pub fn new(event: &'static str, handler: impl FnMut(web_sys::Event) + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if let Err(e) =
            window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::error!(event, error = ?e, "failed to add window listener");
            return None;
        }
        Some(Self { event, closure })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }
}

/// Listen for host messages posted to the window
pub fn listen_messages(mut on_message: impl FnMut(Value) + 'static) -> Option<WindowListener> {
    WindowListener::new("message", move |event| {
        let Some(event) = event.dyn_ref::<web_sys::MessageEvent>() else {
            return;
        };
        match serde_wasm_bindgen::from_value::<Value>(event.data()) {
            Ok(message) => on_message(message),
            Err(e) => tracing::debug!(error = %e, "ignoring non-JSON window message"),
        }
    })
}

/// Which edge of a key press fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

/// Listen for key presses, skipping auto-repeat
pub fn listen_keys(on_key: impl Fn(KeyEdge, String) + 'static) -> Vec<WindowListener> {
    let on_key: Rc<dyn Fn(KeyEdge, String)> = Rc::new(on_key);
    let listen = |event_type: &'static str, edge: KeyEdge| {
        let on_key = Rc::clone(&on_key);
        WindowListener::new(event_type, move |event| {
            if let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>()
                && !event.repeat()
            {
                on_key(edge, event.key());
            }
        })
    };

    [listen("keydown", KeyEdge::Down), listen("keyup", KeyEdge::Up)]
        .into_iter()
        .flatten()
        .collect()
}
