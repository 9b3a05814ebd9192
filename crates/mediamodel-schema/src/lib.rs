//! Convention engine and model build pipeline.
//!
//! # Role In The Architecture
//!
//! `mediamodel-schema` turns a set of bare entity registrations into a
//! fully-configured, frozen [`SchemaModel`](mediamodel_core::SchemaModel).
//! It owns three things:
//!
//! - the **convention contracts** ([`EntityConvention`], [`TypeConvention`])
//!   and the phase/priority machinery that orders them,
//! - the **convention provider** ([`ConventionProvider`]), which discovers
//!   registered conventions and instantiates them through a factory,
//!   failing fast on anything abstract or contract-less,
//! - the **model builder** ([`ModelBuilder`]), which runs the pipeline:
//!   pre-phase conventions, explicit mapping closures, type conventions,
//!   post-phase conventions, freeze.
//!
//! The concrete catalog conventions live in [`conventions`]. Each one is
//! idempotent: re-running a full build pass over an already-configured
//! model changes nothing.
//!
//! # Who Uses This Crate
//!
//! Application hosts call [`ModelBuilder`] once at startup, then share the
//! frozen model behind an `Arc` and publish its capability sets to the
//! process-wide registry.

pub mod builder;
pub mod convention;
pub mod conventions;
pub mod provider;

pub use builder::ModelBuilder;
pub use convention::{ConventionPhase, EntityConvention, TypeConvention};
pub use provider::{
    ConventionContract, ConventionCtor, ConventionDescriptor, ConventionFactory,
    ConventionModule, ConventionProvider, DefaultConventionFactory,
};
