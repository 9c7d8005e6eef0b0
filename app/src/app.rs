use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use lifeline_core::dev::mock_events;
use lifeline_core::registry::{PanelChange, RegistryBinding, SharedRegistry};
use lifeline_core::{
    Bridge, BridgeError, BridgeSink, Clock, DeathScreen, HoldCooldownEngine, HoldTicket, HttpTransport,
    InjuryList, NotificationQueue, PanelRegistry, Subscription,
};
use lifeline_types::{
    DeathScreenData, NotificationData, OutboundRequest, OverlayConfig, ToastSeverity, events,
    panels,
};

use crate::api::{self, KeyEdge, NuiHost, PerformanceClock, WindowListener};
use crate::components::{DeathScreenPanel, InjuriesPanel, InventoryPanel, MainPanel, ToastFrame};

static CSS: Asset = asset!("/assets/styles.css");

static CONFIG: OnceLock<OverlayConfig> = OnceLock::new();

/// Install the configuration `App` starts with; later calls are ignored
pub fn set_config(config: OverlayConfig) {
    let _ = CONFIG.set(config);
}

fn config() -> OverlayConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared State
// ─────────────────────────────────────────────────────────────────────────────

pub type OverlayBridge = Bridge<HttpTransport, NuiHost>;
pub type Engine = HoldCooldownEngine<PerformanceClock>;

/// Everything the panels share, provided through context.
///
/// Components subscribe to `revision` and read the Rc state while rendering;
/// every mutation bumps it.
#[derive(Clone)]
pub struct Overlay {
    pub config: Rc<OverlayConfig>,
    pub bridge: Rc<OverlayBridge>,
    pub registry: SharedRegistry,
    pub engine: Rc<RefCell<Engine>>,
    pub deathscreen: Rc<RefCell<DeathScreen>>,
    pub injuries: Rc<RefCell<InjuryList>>,
    pub toasts: Rc<RefCell<NotificationQueue>>,
    pub clock: PerformanceClock,
    pub revision: Signal<u64>,
    /// Hold started from a button press, if any
    pointer_hold: Rc<Cell<Option<HoldTicket>>>,
}

impl Overlay {
    fn new(config: OverlayConfig, revision: Signal<u64>) -> Self {
        let clock = PerformanceClock::new();
        let toasts = Rc::new(RefCell::new(NotificationQueue::new(config.notifications)));
        let bridge = Rc::new(Bridge::new(HttpTransport::new(), NuiHost, &config));
        let sink = BridgeSink::new(Rc::clone(&bridge), api::spawn_task).on_error({
            let toasts = Rc::clone(&toasts);
            let clock = clock.clone();
            move |err| report_failure(&toasts, &clock, revision, err)
        });
        let engine = HoldCooldownEngine::new(clock.clone(), &config.hold, sink);

        Self {
            deathscreen: Rc::new(RefCell::new(DeathScreen::new(&config.keys))),
            injuries: Rc::new(RefCell::new(InjuryList::new(config.injuries))),
            toasts,
            registry: Rc::new(RefCell::new(PanelRegistry::new())),
            engine: Rc::new(RefCell::new(engine)),
            config: Rc::new(config),
            bridge,
            clock,
            revision,
            pointer_hold: Rc::default(),
        }
    }

    /// Mark shared state as changed so subscribed components re-render
    pub fn refresh(&self) {
        let mut revision = self.revision;
        *revision.write() += 1;
    }

    pub fn deathscreen_data(&self) -> DeathScreenData {
        self.registry.borrow().data_as(panels::DEATHSCREEN)
    }

    /// Fire-and-forget request; a failure surfaces as a critical toast
    pub fn send(&self, request: OutboundRequest) {
        let overlay = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = overlay.bridge.send_request(&request).await {
                report_failure(&overlay.toasts, &overlay.clock, overlay.revision, &err);
            }
        });
    }

    /// Begin a hold on `action` and drive it with frame ticks until it ends
    pub fn press(&self, action: &str) {
        let data = self.deathscreen_data();
        let result = {
            let deathscreen = self.deathscreen.borrow();
            deathscreen.press(&mut *self.engine.borrow_mut(), action, &data)
        };
        match result {
            Ok(ticket) => {
                self.pointer_hold.set(Some(ticket));
                self.run_hold(ticket);
            }
            Err(rejected) => tracing::debug!(action, reason = %rejected, "hold not started"),
        }
        self.refresh();
    }

    pub fn lift(&self) {
        self.pointer_hold.set(None);
        if self.deathscreen.borrow().lift(&mut *self.engine.borrow_mut()) {
            self.refresh();
        }
    }

    /// Window-level pointer release: ends the hold only if a button press
    /// started it, so key holds survive stray clicks
    fn lift_pointer(&self) {
        let Some(ticket) = self.pointer_hold.take() else {
            return;
        };
        if self.engine.borrow().active_ticket() == Some(ticket) {
            self.lift();
        }
    }

    fn on_key(&self, edge: KeyEdge, key: &str) {
        match edge {
            KeyEdge::Down => {
                let data = self.deathscreen_data();
                let visible = self.registry.borrow().is_visible(panels::DEATHSCREEN);
                let ticket = self
                    .deathscreen
                    .borrow()
                    .key_down(&mut *self.engine.borrow_mut(), key, &data, visible);
                if let Some(ticket) = ticket {
                    self.run_hold(ticket);
                    self.refresh();
                }
            }
            KeyEdge::Up => {
                if self.deathscreen.borrow().key_up(&mut *self.engine.borrow_mut(), key) {
                    self.refresh();
                }
            }
        }
    }

    fn run_hold(&self, ticket: HoldTicket) {
        let overlay = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            loop {
                TimeoutFuture::new(16).await;
                let outcome = overlay.engine.borrow_mut().tick(ticket);
                overlay.refresh();
                if !outcome.keep_ticking() {
                    break;
                }
            }
        });
    }

    /// Mirror panel data into the per-panel models
    fn on_panel_change(&self, change: &PanelChange) {
        if change.touched_data() {
            let registry = self.registry.borrow();
            match change.id.as_str() {
                panels::INJURIES => self.injuries.borrow_mut().load(registry.data(panels::INJURIES)),
                panels::NOTIFICATION => {
                    if let Some(data) = registry.data(panels::NOTIFICATION) {
                        self.toasts.borrow_mut().push_data(data, self.clock.now());
                    }
                }
                _ => {}
            }
        }
        self.refresh();
    }
}

fn report_failure(
    toasts: &RefCell<NotificationQueue>,
    clock: &PerformanceClock,
    mut revision: Signal<u64>,
    err: &BridgeError,
) {
    toasts.borrow_mut().push(
        NotificationData {
            message: format!("Request '{}' failed", err.action()),
            severity: ToastSeverity::Critical,
            duration_ms: None,
        },
        clock.now(),
    );
    *revision.write() += 1;
}

/// Host wiring that lives as long as the app
struct Bindings {
    _registry: RegistryBinding,
    _responded: Subscription,
    _listeners: Vec<WindowListener>,
}

fn bind(overlay: &Overlay) -> Bindings {
    let registry = {
        let handler = overlay.clone();
        RegistryBinding::attach(
            overlay.bridge.events(),
            Rc::clone(&overlay.registry),
            move |change| handler.on_panel_change(change),
        )
    };

    let responded = {
        let handler = overlay.clone();
        overlay.bridge.subscribe(events::RESPONDED, move |_| {
            handler
                .deathscreen
                .borrow_mut()
                .on_responded(&mut *handler.engine.borrow_mut(), &handler.config.hold);
            handler.refresh();
        })
    };

    let mut listeners = Vec::new();
    let bridge = Rc::clone(&overlay.bridge);
    listeners.extend(api::listen_messages(move |message| {
        if let Err(e) = bridge.deliver(&message) {
            tracing::debug!(error = %e, "dropped host message");
        }
    }));
    let keys = overlay.clone();
    listeners.extend(api::listen_keys(move |edge, key| keys.on_key(edge, &key)));
    // Pointer holds end wherever the button is released, even after the
    // death screen unmounted under the cursor
    let pointer = overlay.clone();
    listeners.extend(WindowListener::new("mouseup", move |_| pointer.lift_pointer()));

    Bindings {
        _registry: registry,
        _responded: responded,
        _listeners: listeners,
    }
}

/// Without a host the overlay plays the mock startup sequence to itself
fn play_mock_events(overlay: &Overlay) {
    tracing::info!("no host attached, delivering mock events");
    for event in mock_events(api::epoch_ms()) {
        let bridge = Rc::clone(&overlay.bridge);
        wasm_bindgen_futures::spawn_local(async move {
            if !event.delay.is_zero() {
                TimeoutFuture::new(event.delay.as_millis() as u32).await;
            }
            if let Err(e) = bridge.deliver(&event.message) {
                tracing::warn!(error = %e, "mock event rejected");
            }
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Root Component
// ─────────────────────────────────────────────────────────────────────────────

#[component]
pub fn App() -> Element {
    let revision = use_signal(|| 0u64);
    let overlay = use_context_provider(|| Overlay::new(config(), revision));

    let _bindings = use_hook({
        let overlay = overlay.clone();
        move || {
            let bindings = Rc::new(bind(&overlay));
            if overlay.bridge.is_attached() {
                let bridge = Rc::clone(&overlay.bridge);
                spawn(async move {
                    let _ = bridge.request_server_data().await;
                });
            } else {
                play_mock_events(&overlay);
            }
            bindings
        }
    });

    // Cooldowns count down once per elapsed second
    use_future({
        let overlay = overlay.clone();
        move || {
            let overlay = overlay.clone();
            async move {
                loop {
                    TimeoutFuture::new(1000).await;
                    let ready = overlay.engine.borrow_mut().advance_cooldowns();
                    if !overlay.engine.borrow().cooldowns().is_empty() || !ready.is_empty() {
                        overlay.refresh();
                    }
                }
            }
        }
    });

    // Expire toasts
    use_future({
        let overlay = overlay.clone();
        move || {
            let overlay = overlay.clone();
            async move {
                loop {
                    TimeoutFuture::new(TOAST_SWEEP.as_millis() as u32).await;
                    let expired = overlay.toasts.borrow_mut().expire(overlay.clock.now());
                    if !expired.is_empty() {
                        overlay.refresh();
                    }
                }
            }
        }
    });

    rsx! {
        link { rel: "stylesheet", href: CSS }
        div { class: "overlay-root",
            MainPanel {}
            DeathScreenPanel {}
            InjuriesPanel {}
            InventoryPanel {}
            ToastFrame {}
        }
    }
}

const TOAST_SWEEP: Duration = Duration::from_millis(250);

/// Context accessor for components
pub fn use_overlay() -> Overlay {
    use_context::<Overlay>()
}
