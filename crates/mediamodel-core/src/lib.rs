//! Core types for the mediamodel convention engine.
//!
//! `mediamodel-core` is the **foundation layer** for the whole workspace. It
//! defines the vocabulary shared by the convention engine, the save-trigger
//! framework, and the validation builder.
//!
//! # Role In The Architecture
//!
//! - **Capability contracts**: [`Capability`] and [`CapabilitySet`] are the
//!   marker contracts an entity type opts into (audit, soft delete, row
//!   version, translation, public id, ownership).
//! - **Schema model**: [`SchemaModel`] and [`EntityDescriptor`] are the
//!   mutable-while-building, frozen-after view of every modeled entity type.
//! - **Expressions**: [`Predicate`] is the small typed expression tree used
//!   for generated query filters.
//! - **Structured concurrency**: re-exports `Cx` and `Outcome` from
//!   asupersync so every async save operation is cancel-correct.
//!
//! # Who Uses This Crate
//!
//! - `mediamodel-schema` mutates [`EntityDescriptor`]s through conventions.
//! - `mediamodel-session` keys triggers off the frozen capability registry
//!   and moves [`Value`]s through change records.
//! - `mediamodel-validate` is independent of the schema model but shares the
//!   error vocabulary.
//!
//! Most applications should use the `mediamodel` facade; reach for
//! `mediamodel-core` directly when writing a store backend.

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Budget, Cx, Outcome, RegionId, TaskId};

pub mod capability;
pub mod descriptor;
pub mod error;
pub mod expr;
pub mod value;

pub use capability::{
    Capability, CapabilityRegistry, CapabilitySet, CapabilityTag, capability_registry,
};
pub use descriptor::{
    DeleteBehavior, EntityDescriptor, FilterSource, IndexDescriptor, Multiplicity,
    NavigationDescriptor, PropertyDescriptor, PropertyType, SchemaModel, SequenceDescriptor,
    ValueGeneration,
};
pub use error::{Error, Result};
pub use expr::{EntityView, Predicate, PropertyRef};
pub use value::Value;
