//! Host notifications
//!
//! Sections subscribe to host events through an [`EventBus`]. Every
//! subscription returns a [`Subscription`] handle; dropping the handle
//! removes the listener. The same handle type wraps DOM listeners on the web
//! so a section's wiring can be torn down in one place.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::settings::Theme;
use crate::ui_state::UiState;

/// Something other sections may react to
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Open flag or active section changed
    StateChanged(UiState),
    /// Theme class swapped
    ThemeApplied(Theme),
    /// Card catalog and trivia finished loading
    CardsLoaded { cards: usize, trivia: usize },
    /// Session user changed (login or logout)
    LoginStateChanged,
}

type Listener = Rc<dyn Fn(&HostEvent)>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Single-threaded publish/subscribe for [`HostEvent`]
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener until the returned handle is dropped
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&HostEvent) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Rc::new(listener)));
            id
        };
        let bus: Weak<RefCell<BusInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = bus.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Deliver an event to every current listener
    ///
    /// Listeners may subscribe or unsubscribe while handling; changes take
    /// effect from the next emit.
    pub fn emit(&self, event: HostEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Teardown handle; runs its cleanup exactly once on drop
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Keep the listener for the rest of the page's life
    ///
    /// The teardown is leaked rather than dropped: it may own the JS closure
    /// backing a DOM listener.
    pub fn forget(mut self) {
        if let Some(teardown) = self.teardown.take() {
            std::mem::forget(teardown);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
