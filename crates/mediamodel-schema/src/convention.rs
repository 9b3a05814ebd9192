//! Convention contracts.
//!
//! A convention is a small, stateless rule that edits schema metadata
//! during the model build. Entity conventions run once per matching entity
//! in a declared phase; type conventions run once per property across the
//! whole model, between the two entity phases.

use mediamodel_core::{EntityDescriptor, PropertyDescriptor, Result, SchemaModel};

/// When an entity convention runs relative to explicit mapping code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConventionPhase {
    /// Before explicit mapping: adds members explicit mapping may then
    /// refine.
    PreModel,
    /// After explicit mapping: reads the final member set and synthesizes
    /// filters, sequences, and defaults.
    PostModel,
}

/// A per-entity schema rule.
///
/// Within a phase, conventions run ordered by [`priority`](Self::priority)
/// (lower first), then registration order. Conventions that do not depend
/// on each other's output keep the default priority and must be written so
/// their relative order does not matter.
pub trait EntityConvention: Send + Sync {
    /// Stable name, used in tracing and error messages.
    fn name(&self) -> &'static str;

    /// Phase this convention runs in.
    fn phase(&self) -> ConventionPhase;

    /// Ordering within the phase. Lower runs earlier. Default 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this convention applies to the given entity. Called once
    /// per entity per build; `configure` only runs when this returns true.
    fn applies_to(&self, entity: &EntityDescriptor) -> bool;

    /// Edit the model for one entity. The whole model is passed so a
    /// convention can read sibling entities and add model-level sequences.
    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()>;
}

/// A per-property schema rule, applied to every property of every entity.
pub trait TypeConvention: Send + Sync {
    /// Stable name, used in tracing and error messages.
    fn name(&self) -> &'static str;

    /// Edit one property descriptor.
    fn configure_property(
        &self,
        entity_name: &str,
        property: &mut PropertyDescriptor,
    ) -> Result<()>;
}
