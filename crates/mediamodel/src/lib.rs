//! MediaModel: convention-driven entity modeling for a media catalog.
//!
//! `mediamodel` is the **facade crate** that ties the workspace together. It
//! re-exports the schema builder, the catalog convention set, the save-trigger
//! pipeline, and the recursive validation builder so applications can depend
//! on a single crate.
//!
//! # Role In The Architecture
//!
//! - **Schema**: `ModelBuilder` plus the catalog conventions turn declared
//!   entities and capabilities into a frozen `SchemaModel`.
//! - **Persistence**: `SaveExecutor` runs before-save triggers, commits one
//!   batch through a `Store`, and runs after-save triggers, reporting
//!   secondary failures in a `SaveReport`.
//! - **Validation**: `ValidationBuilder` walks owned object graphs and
//!   collects `ValidationResult`s with dotted, indexed property paths.
//! - **Structured concurrency**: re-exports `Cx` and `Outcome` from
//!   asupersync so every async save operation is cancel-correct.
//!
//! # Who Uses This Crate
//!
//! - Application hosts build their model once at startup, publish entity
//!   capabilities, and hold a `SaveExecutor` for the life of the process.
//! - Tests exercise the full pipeline against `MemoryStore` without a
//!   database.
//!
//! Reach for the member crates directly (`mediamodel-core`,
//! `mediamodel-schema`, `mediamodel-session`, `mediamodel-validate`) when
//! writing custom conventions, stores, or triggers.

pub use asupersync::{Budget, Cx, Outcome, RegionId, TaskId};

pub use mediamodel_core as core;
pub use mediamodel_schema as schema;
pub use mediamodel_session as session;
pub use mediamodel_validate as validate;

pub use mediamodel_core::{
    Capability, CapabilityRegistry, CapabilitySet, CapabilityTag, DeleteBehavior,
    EntityDescriptor, EntityView, Error, FilterSource, IndexDescriptor, Multiplicity,
    NavigationDescriptor, Predicate, PropertyDescriptor, PropertyRef, PropertyType, Result,
    SchemaModel, SequenceDescriptor, Value, ValueGeneration, capability_registry,
};
pub use mediamodel_schema::{
    ConventionPhase, ConventionProvider, EntityConvention, ModelBuilder, TypeConvention,
};
pub use mediamodel_session::{
    ChangeKind, ChangeRecord, EntityValues, MemorySession, MemoryStore, SaveBatch, SaveExecutor,
    SaveReport, SaveTrigger, SecondaryFailure, Store, StoreSession, TriggerContext, TriggerKey,
    TriggerRegistry,
};
pub use mediamodel_validate::{
    PropertyPath, ValidateOwned, ValidationBuilder, ValidationResult, validate_entity,
};

/// Common imports for applications using the full pipeline.
pub mod prelude {
    pub use crate::{
        Capability, CapabilityTag, ChangeKind, ChangeRecord, Cx, EntityDescriptor, EntityValues,
        Error, MemoryStore, ModelBuilder, Outcome, Predicate, PropertyDescriptor, PropertyType,
        Result, SaveBatch, SaveExecutor, SaveReport, SaveTrigger, SchemaModel, Store,
        StoreSession, TriggerContext, TriggerRegistry, ValidateOwned, ValidationBuilder,
        ValidationResult, Value, capability_registry, validate_entity,
    };
    pub use mediamodel_schema::conventions::catalog_module;
    pub use mediamodel_session::triggers::{
        PrimaryReleaseTrigger, ProgressClampTrigger, RelatedMediaCascadeTrigger,
        ReleaseRequiredTrigger, SongReferenceClearTrigger,
    };
}
