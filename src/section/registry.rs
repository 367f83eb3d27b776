//! Section registry
//!
//! One record per section identifier, created on first reference and kept for
//! the whole page session.

use std::collections::HashMap;

use super::{SectionId, SectionPhase};
use crate::events::Subscription;

/// Lazily populated state for one section
#[derive(Debug)]
pub struct SectionRecord<C> {
    /// Surface container holding the section's markup
    pub container: C,
    pub phase: SectionPhase,
    /// Carries the "active" designation
    pub active: bool,
    /// Listeners installed by the last initialization
    pub subscriptions: Vec<Subscription>,
    /// Markup fetches started for this section
    pub fetches: u32,
    /// Initializer runs for this section
    pub inits: u32,
}

impl<C> SectionRecord<C> {
    pub fn new(container: C) -> Self {
        Self {
            container,
            phase: SectionPhase::Unloaded,
            active: false,
            subscriptions: Vec::new(),
            fetches: 0,
            inits: 0,
        }
    }
}

/// All sections seen this session, keyed by identifier
#[derive(Debug)]
pub struct SectionRegistry<C> {
    records: HashMap<SectionId, SectionRecord<C>>,
    /// Creation order, for stable iteration
    order: Vec<SectionId>,
}

impl<C> Default for SectionRegistry<C> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<C: Clone> SectionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &SectionId) -> Option<&SectionRecord<C>> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &SectionId) -> Option<&mut SectionRecord<C>> {
        self.records.get_mut(id)
    }

    /// Existing record, or a new one around the container from `make`
    pub fn ensure(&mut self, id: &SectionId, make: impl FnOnce() -> C) -> &mut SectionRecord<C> {
        if !self.records.contains_key(id) {
            self.order.push(id.clone());
        }
        self.records
            .entry(id.clone())
            .or_insert_with(|| SectionRecord::new(make()))
    }

    /// Move the active designation to `id`
    ///
    /// Returns the containers whose designation changed, deactivations first.
    pub fn set_active(&mut self, id: &SectionId) -> Vec<(C, bool)> {
        let mut changes = Vec::new();
        for sid in &self.order {
            let Some(record) = self.records.get_mut(sid) else {
                continue;
            };
            if record.active && sid != id {
                record.active = false;
                changes.push((record.container.clone(), false));
            }
        }
        if let Some(record) = self.records.get_mut(id) {
            if !record.active {
                record.active = true;
                changes.push((record.container.clone(), true));
            }
        }
        changes
    }

    pub fn active_id(&self) -> Option<&SectionId> {
        self.order
            .iter()
            .find(|id| self.records.get(*id).is_some_and(|r| r.active))
    }

    pub fn active_count(&self) -> usize {
        self.records.values().filter(|r| r.active).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SectionId {
        SectionId::new(s).unwrap()
    }

    #[test]
    fn test_ensure_creates_once() {
        let mut registry: SectionRegistry<u32> = SectionRegistry::new();
        let mut made = 0;
        registry.ensure(&id("home"), || {
            made += 1;
            1
        });
        registry.ensure(&id("home"), || {
            made += 1;
            2
        });
        assert_eq!(made, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id("home")).unwrap().container, 1);
    }

    #[test]
    fn test_set_active_moves_designation() {
        let mut registry: SectionRegistry<&str> = SectionRegistry::new();
        registry.ensure(&id("home"), || "home");
        registry.ensure(&id("memo"), || "memo");

        assert_eq!(registry.set_active(&id("home")), vec![("home", true)]);
        assert_eq!(registry.set_active(&id("memo")), vec![("home", false), ("memo", true)]);
        assert!(registry.set_active(&id("memo")).is_empty());
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.active_id(), Some(&id("memo")));
    }

    #[test]
    fn test_set_active_unknown_clears_all() {
        let mut registry: SectionRegistry<&str> = SectionRegistry::new();
        registry.ensure(&id("home"), || "home");
        registry.set_active(&id("home"));
        assert_eq!(registry.set_active(&id("ghost")), vec![("home", false)]);
        assert_eq!(registry.active_count(), 0);
    }
}
