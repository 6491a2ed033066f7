#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session-scoped publish/subscribe channel carrying interaction events.
//!
//! A channel is constructed by whoever wires an engine to a presentation
//! surface and lives exactly as long as that wiring. Nothing is global, so a
//! restarted session never observes handlers registered by its predecessor.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use tracing::trace;

type Handler<E> = Rc<dyn Fn(&E)>;

/// Identifier returned by [`InteractionChannel::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Synchronous, single-threaded publish/subscribe channel.
///
/// Every method takes `&self`, so handlers may subscribe or unsubscribe while
/// a publish is in flight. Such changes take effect from the next publish.
pub struct InteractionChannel<E> {
    handlers: RefCell<Vec<(SubscriptionId, Handler<E>)>>,
    last_id: Cell<u64>,
}

impl<E> InteractionChannel<E> {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            last_id: Cell::new(0),
        }
    }

    /// Registers a handler invoked for every subsequent publish.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId(self.last_id.get() + 1);
        self.last_id.set(id.0);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        trace!(subscription = id.0, "handler subscribed");
        id
    }

    /// Removes a handler. Returns `false` when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(candidate, _)| *candidate != id);
        let removed = handlers.len() != before;
        trace!(subscription = id.0, removed, "handler unsubscribed");
        removed
    }

    /// Delivers `event` to every handler registered when the publish began,
    /// in registration order.
    pub fn publish(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        if handlers.is_empty() {
            trace!("event published without subscribers");
        }

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<E> Default for InteractionChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for InteractionChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
