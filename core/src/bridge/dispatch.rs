//! Inbound event dispatch
//!
//! Subscribers are held per event type and invoked synchronously, in
//! subscription order. A [`Subscription`] handle stops its own handler when
//! dropped or explicitly unsubscribed; other handlers for the same event type
//! are unaffected.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

type Handler = Rc<dyn Fn(&Value)>;

struct Entry {
    id: u64,
    event_type: String,
    handler: Handler,
    active: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Subscriber table for host-originated events
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every inbound message whose type is `event_type`
    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        handler: impl Fn(&Value) + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        // Handles dropped mid-dispatch could not remove themselves
        inner.entries.retain(|e| e.active.get());

        let id = inner.next_id;
        inner.next_id += 1;
        let active = Rc::new(Cell::new(true));
        inner.entries.push(Entry {
            id,
            event_type: event_type.into(),
            handler: Rc::new(handler),
            active: Rc::clone(&active),
        });

        Subscription {
            id,
            active,
            table: Rc::downgrade(&self.inner),
            detached: false,
        }
    }

    /// Invoke every active handler for `event_type` with `payload`.
    ///
    /// Returns the number of handlers invoked. Handlers may subscribe or
    /// unsubscribe while running; an unsubscribed handler is skipped even if
    /// it was registered before this delivery started.
    pub fn dispatch(&self, event_type: &str, payload: &Value) -> usize {
        let targets: Vec<(Handler, Rc<Cell<bool>>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.event_type == event_type && e.active.get())
            .map(|e| (Rc::clone(&e.handler), Rc::clone(&e.active)))
            .collect();

        let mut invoked = 0;
        for (handler, active) in targets {
            if active.get() {
                handler(payload);
                invoked += 1;
            }
        }
        invoked
    }

    /// Number of live subscriptions across all event types
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.active.get())
            .count()
    }
}

/// Handle for one registered handler.
///
/// Dropping the handle unsubscribes. Call [`Subscription::detach`] to keep the
/// handler registered for the lifetime of the dispatcher.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    active: Rc<Cell<bool>>,
    table: Weak<RefCell<Inner>>,
    detached: bool,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

impl Subscription {
    /// Stop future invocations of this handler
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Leave the handler registered; the handle no longer controls it
    pub fn detach(mut self) {
        self.detached = true;
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        self.active.set(false);
        if let Some(table) = self.table.upgrade()
            && let Ok(mut inner) = table.try_borrow_mut()
        {
            inner.entries.retain(|e| e.id != self.id);
        }
    }
}
