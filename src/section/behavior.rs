//! Section behavior initializers
//!
//! Sections with dynamic content register an initializer at startup. The host
//! runs it once after each markup load and again on every re-display, so an
//! initializer must be safe to call repeatedly: listeners it installs go into
//! the context and are torn down before the next run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::SectionId;
use crate::catalog::AppState;
use crate::error::BehaviorError;
use crate::events::{EventBus, HostEvent, Subscription};
use crate::persistence::KeyValueStore;

/// Initialization entry point of a section
pub type Initializer = Rc<dyn Fn(&mut InitContext<'_>) -> Result<(), BehaviorError>>;

/// What an initializer may touch
pub struct InitContext<'a> {
    pub section: &'a SectionId,
    pub app: &'a Rc<RefCell<AppState>>,
    pub events: &'a EventBus,
    /// Durable storage; clone the handle to use it from listeners
    pub store: Rc<dyn KeyValueStore>,
    subscriptions: Vec<Subscription>,
}

impl<'a> InitContext<'a> {
    pub fn new(
        section: &'a SectionId,
        app: &'a Rc<RefCell<AppState>>,
        events: &'a EventBus,
        store: Rc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            section,
            app,
            events,
            store,
            subscriptions: Vec::new(),
        }
    }

    /// Keep a handle alive until the section is re-initialized
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Subscribe to host events for the lifetime of this initialization
    pub fn subscribe(&mut self, listener: impl Fn(&HostEvent) + 'static) {
        let subscription = self.events.subscribe(listener);
        self.hold(subscription);
    }

    /// Error for this section with a reason
    pub fn fail(&self, reason: impl Into<String>) -> BehaviorError {
        BehaviorError::Init {
            section: self.section.to_string(),
            reason: reason.into(),
        }
    }

    pub fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }
}

/// Explicit section id -> initializer mapping
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    initializers: HashMap<SectionId, Initializer>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the initializer for a section
    pub fn register(
        &mut self,
        id: SectionId,
        init: impl Fn(&mut InitContext<'_>) -> Result<(), BehaviorError> + 'static,
    ) -> &mut Self {
        self.register_shared(id, Rc::new(init))
    }

    pub fn register_shared(&mut self, id: SectionId, init: Initializer) -> &mut Self {
        if self.initializers.insert(id.clone(), init).is_some() {
            log::warn!("Replaced behavior for section {}", id);
        }
        self
    }

    pub fn resolve(&self, id: &SectionId) -> Result<Initializer, BehaviorError> {
        self.initializers
            .get(id)
            .cloned()
            .ok_or_else(|| BehaviorError::NotRegistered(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.initializers.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("BehaviorRegistry").field("sections", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_resolve_missing_is_not_registered() {
        let registry = BehaviorRegistry::new();
        let id = SectionId::new("search").unwrap();
        let err = registry.resolve(&id).err().unwrap();
        assert!(err.is_missing());
    }

    #[test]
    fn test_context_collects_subscriptions() {
        let mut registry = BehaviorRegistry::new();
        let id = SectionId::new("home").unwrap();
        registry.register(id.clone(), |cx| {
            cx.subscribe(|_| {});
            cx.subscribe(|_| {});
            Ok(())
        });

        let app = Rc::new(RefCell::new(AppState::default()));
        let events = EventBus::new();
        let mut cx = InitContext::new(&id, &app, &events, Rc::new(MemoryStore::new()));
        let init = registry.resolve(&id).unwrap();
        init(&mut cx).unwrap();

        let subs = cx.into_subscriptions();
        assert_eq!(subs.len(), 2);
        assert_eq!(events.listener_count(), 2);
        drop(subs);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_fail_names_section() {
        let id = SectionId::new("options").unwrap();
        let app = Rc::new(RefCell::new(AppState::default()));
        let events = EventBus::new();
        let cx = InitContext::new(&id, &app, &events, Rc::new(MemoryStore::new()));
        assert_eq!(
            cx.fail("form missing").to_string(),
            "section options failed to initialize: form missing"
        );
    }
}
