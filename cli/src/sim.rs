//! Virtual-time replay of a scenario against the overlay core
//!
//! Time advances in 16 ms frames. Each frame ticks the active hold, applies
//! elapsed cooldown seconds, expires toasts and runs any requests the frame
//! produced to completion against a loopback host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lifeline_core::hold::{BridgeSink, LocalTask};
use lifeline_core::registry::{PanelChange, RegistryBinding, SharedRegistry};
use lifeline_core::{
    Bridge, Clock, DeathScreen, FixedResource, HoldCooldownEngine, LoopbackTransport,
    ManualClock, NotificationQueue, PanelRegistry, Subscription,
};
use lifeline_types::{DeathScreenData, OverlayConfig, events, panels};
use serde::Serialize;
use serde_json::Value;

use crate::scenario::{Step, StepInput};

pub const FRAME_MS: u64 = 16;

/// A request the overlay sent to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentRequest {
    pub at_ms: u64,
    pub url: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelState {
    pub id: String,
    pub visible: bool,
    pub data: Value,
}

/// Everything observable at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub final_ms: u64,
    pub requests: Vec<SentRequest>,
    pub panels: Vec<PanelState>,
    pub cooldowns: BTreeMap<String, u32>,
    pub holding: Option<String>,
    pub help_text: Option<String>,
    pub toasts: Vec<String>,
}

type SimBridge = Bridge<LoopbackTransport, FixedResource>;

pub struct Simulator {
    clock: ManualClock,
    transport: LoopbackTransport,
    bridge: Rc<SimBridge>,
    registry: SharedRegistry,
    engine: Rc<RefCell<HoldCooldownEngine<ManualClock>>>,
    deathscreen: Rc<RefCell<DeathScreen>>,
    toasts: Rc<RefCell<NotificationQueue>>,
    pending: Rc<RefCell<Vec<LocalTask>>>,
    sent: Vec<SentRequest>,
    _registry_binding: RegistryBinding,
    _responded: Subscription,
}

impl Simulator {
    pub fn new(config: OverlayConfig, resource: Option<String>) -> Self {
        let clock = ManualClock::new();
        let transport = LoopbackTransport::default();
        let host = FixedResource(resource.unwrap_or_else(|| config.fallback_resource.clone()));
        let bridge = Rc::new(Bridge::new(transport.clone(), host, &config));

        let pending: Rc<RefCell<Vec<LocalTask>>> = Rc::default();
        let spawned = Rc::clone(&pending);
        let sink = BridgeSink::new(Rc::clone(&bridge), move |task| spawned.borrow_mut().push(task));
        let engine = Rc::new(RefCell::new(HoldCooldownEngine::new(
            clock.clone(),
            &config.hold,
            sink,
        )));

        let registry: SharedRegistry = Rc::new(RefCell::new(PanelRegistry::new()));
        let deathscreen = Rc::new(RefCell::new(DeathScreen::new(&config.keys)));
        let toasts = Rc::new(RefCell::new(NotificationQueue::new(config.notifications)));

        let registry_binding = {
            let registry = Rc::clone(&registry);
            let toasts = Rc::clone(&toasts);
            let clock = clock.clone();
            RegistryBinding::attach(bridge.events(), Rc::clone(&registry), move |change| {
                mirror_notification(&registry, &toasts, &clock, change);
            })
        };

        let responded = {
            let deathscreen = Rc::clone(&deathscreen);
            let engine = Rc::clone(&engine);
            let hold = config.hold.clone();
            bridge.subscribe(events::RESPONDED, move |_| {
                deathscreen
                    .borrow_mut()
                    .on_responded(&mut *engine.borrow_mut(), &hold);
            })
        };

        Self {
            clock,
            transport,
            bridge,
            registry,
            engine,
            deathscreen,
            toasts,
            pending,
            sent: Vec::new(),
            _registry_binding: registry_binding,
            _responded: responded,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now().as_millis() as u64
    }

    /// Replay `steps`, then keep running for `settle_ms`
    pub async fn run(&mut self, steps: &[Step], settle_ms: u64) -> Report {
        for step in steps {
            self.advance_to(step.at_ms).await;
            self.apply(&step.input);
            self.flush().await;
        }
        let end = self.now_ms() + settle_ms;
        self.advance_to(end).await;
        self.report()
    }

    /// Step frame by frame up to `target_ms`
    pub async fn advance_to(&mut self, target_ms: u64) {
        while self.now_ms() < target_ms {
            let step = FRAME_MS.min(target_ms - self.now_ms());
            self.clock.advance_ms(step);
            self.frame();
            self.flush().await;
        }
    }

    fn frame(&self) {
        let mut engine = self.engine.borrow_mut();
        if let Some(ticket) = engine.active_ticket() {
            engine.tick(ticket);
        }
        engine.advance_cooldowns();
        drop(engine);
        self.toasts.borrow_mut().expire(self.clock.now());
    }

    fn apply(&self, input: &StepInput) {
        match input {
            StepInput::Inbound(message) => {
                if let Err(e) = self.bridge.deliver(message) {
                    tracing::warn!(at_ms = self.now_ms(), error = %e, "inbound step rejected");
                }
            }
            StepInput::KeyDown(key) => {
                let (data, visible) = {
                    let registry = self.registry.borrow();
                    (
                        registry.data_as::<DeathScreenData>(panels::DEATHSCREEN),
                        registry.is_visible(panels::DEATHSCREEN),
                    )
                };
                self.deathscreen
                    .borrow()
                    .key_down(&mut *self.engine.borrow_mut(), key, &data, visible);
            }
            StepInput::KeyUp(key) => {
                self.deathscreen
                    .borrow()
                    .key_up(&mut *self.engine.borrow_mut(), key);
            }
        }
    }

    /// Run spawned requests to completion and record what reached the host
    async fn flush(&mut self) {
        loop {
            let tasks: Vec<LocalTask> = self.pending.borrow_mut().drain(..).collect();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                task.await;
            }
        }

        let at_ms = self.now_ms();
        for request in self.transport.take_requests() {
            let body = serde_json::from_str(&request.body).unwrap_or(Value::String(request.body));
            self.sent.push(SentRequest {
                at_ms,
                url: request.url,
                body,
            });
        }
    }

    pub fn report(&self) -> Report {
        let registry = self.registry.borrow();
        let mut panels: Vec<PanelState> = registry
            .panels()
            .map(|panel| PanelState {
                id: panel.id.clone(),
                visible: panel.visible,
                data: panel.data.clone(),
            })
            .collect();
        panels.sort_by(|a, b| a.id.cmp(&b.id));

        let engine = self.engine.borrow();
        Report {
            final_ms: self.now_ms(),
            requests: self.sent.clone(),
            panels,
            cooldowns: engine
                .cooldowns()
                .entries()
                .into_iter()
                .map(|(action, secs)| (action.to_string(), secs))
                .collect(),
            holding: engine.holding().map(str::to_string),
            help_text: self.deathscreen.borrow().help_text().map(str::to_string),
            toasts: self
                .toasts
                .borrow()
                .toasts()
                .map(|toast| toast.message.clone())
                .collect(),
        }
    }
}

fn mirror_notification(
    registry: &SharedRegistry,
    toasts: &RefCell<NotificationQueue>,
    clock: &ManualClock,
    change: &PanelChange,
) {
    if change.id != panels::NOTIFICATION || !change.touched_data() {
        return;
    }
    if let Some(data) = registry.borrow().data(panels::NOTIFICATION) {
        toasts.borrow_mut().push_data(data, clock.now());
    }
}

impl Report {
    /// Human-readable rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        for request in &self.requests {
            out.push_str(&format!(
                "[{:>7} ms] POST {} {}\n",
                request.at_ms, request.url, request.body
            ));
        }
        out.push_str(&format!("--- state at {} ms ---\n", self.final_ms));
        for panel in &self.panels {
            let visibility = if panel.visible { "visible" } else { "hidden" };
            out.push_str(&format!("panel {} ({visibility}): {}\n", panel.id, panel.data));
        }
        for (action, secs) in &self.cooldowns {
            out.push_str(&format!("cooldown {action}: {secs}s\n"));
        }
        if let Some(action) = &self.holding {
            out.push_str(&format!("holding: {action}\n"));
        }
        if let Some(text) = &self.help_text {
            out.push_str(&format!("help: {text}\n"));
        }
        for message in &self.toasts {
            out.push_str(&format!("toast: {message}\n"));
        }
        out
    }
}
