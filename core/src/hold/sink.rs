//! Where committed holds go
//!
//! The engine runs inside synchronous tick callbacks, so it hands each
//! committed action to an [`ActionSink`] instead of awaiting the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use lifeline_types::OutboundRequest;

use crate::bridge::{Bridge, BridgeError, HostEnvironment, Transport};

/// A spawned, single-threaded background task
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Receives host-bound requests produced by completed holds
pub trait ActionSink {
    fn dispatch(&self, request: OutboundRequest);
}

/// Queues requests for the caller to drain and forward
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    queue: Rc<RefCell<VecDeque<OutboundRequest>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<OutboundRequest> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl ActionSink for Outbox {
    fn dispatch(&self, request: OutboundRequest) {
        self.queue.borrow_mut().push_back(request);
    }
}

/// Sends each request through a [`Bridge`] on a caller-supplied spawner.
///
/// A failed send is logged and reported to the optional error hook; the
/// cooldown has already been applied locally either way.
pub struct BridgeSink<T, H> {
    bridge: Rc<Bridge<T, H>>,
    spawn: Rc<dyn Fn(LocalTask)>,
    on_error: Option<Rc<dyn Fn(&BridgeError)>>,
}

impl<T, H> BridgeSink<T, H> {
    pub fn new(bridge: Rc<Bridge<T, H>>, spawn: impl Fn(LocalTask) + 'static) -> Self {
        Self {
            bridge,
            spawn: Rc::new(spawn),
            on_error: None,
        }
    }

    /// Also report failed sends to `handler`
    pub fn on_error(mut self, handler: impl Fn(&BridgeError) + 'static) -> Self {
        self.on_error = Some(Rc::new(handler));
        self
    }
}

impl<T, H> ActionSink for BridgeSink<T, H>
where
    T: Transport + 'static,
    H: HostEnvironment + 'static,
{
    fn dispatch(&self, request: OutboundRequest) {
        let bridge = Rc::clone(&self.bridge);
        let on_error = self.on_error.clone();
        (self.spawn)(Box::pin(async move {
            if let Err(err) = bridge.send_request(&request).await {
                tracing::error!(
                    action = %request.action,
                    error = %err,
                    "committed hold not confirmed by host"
                );
                if let Some(on_error) = on_error {
                    on_error(&err);
                }
            }
        }));
    }
}
