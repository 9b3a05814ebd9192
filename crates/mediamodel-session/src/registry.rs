//! Trigger registration and resolution.

use std::sync::Arc;

use mediamodel_core::{CapabilityTag, SchemaModel};

use crate::save::SaveTrigger;
use crate::store::Store;

/// What a trigger registration is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKey {
    /// Fires for records of one entity type.
    Entity(String),
    /// Fires for records of every entity declaring the capability.
    Capability(CapabilityTag),
}

/// Ordered trigger registrations.
///
/// Resolution walks registrations in order, so triggers fire for a record
/// in the order they were registered, regardless of key kind.
pub struct TriggerRegistry<S: Store> {
    registrations: Vec<(TriggerKey, Arc<dyn SaveTrigger<S>>)>,
}

impl<S: Store> TriggerRegistry<S> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register a trigger for one entity type.
    pub fn for_entity(&mut self, entity: impl Into<String>, trigger: Arc<dyn SaveTrigger<S>>) {
        self.registrations
            .push((TriggerKey::Entity(entity.into()), trigger));
    }

    /// Register a trigger for every entity declaring a capability. The
    /// capability set is resolved against the frozen model at save time.
    pub fn for_capability(&mut self, tag: CapabilityTag, trigger: Arc<dyn SaveTrigger<S>>) {
        self.registrations.push((TriggerKey::Capability(tag), trigger));
    }

    /// Triggers matching one record's entity, in registration order.
    #[must_use]
    pub fn matching(&self, entity: &str, model: &SchemaModel) -> Vec<Arc<dyn SaveTrigger<S>>> {
        self.registrations
            .iter()
            .filter(|(key, _)| match key {
                TriggerKey::Entity(name) => name == entity,
                TriggerKey::Capability(tag) => model
                    .entity(entity)
                    .is_some_and(|e| e.capabilities().has(*tag)),
            })
            .map(|(_, trigger)| Arc::clone(trigger))
            .collect()
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// `(key, trigger name)` pairs for diagnostics.
    #[must_use]
    pub fn debug_state(&self) -> Vec<(TriggerKey, &'static str)> {
        self.registrations
            .iter()
            .map(|(key, trigger)| (key.clone(), trigger.name()))
            .collect()
    }
}

impl<S: Store> Default for TriggerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
