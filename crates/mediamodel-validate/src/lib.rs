//! Recursive, path-aware entity validation.
//!
//! # Role In The Architecture
//!
//! `mediamodel-validate` is the synchronous, CPU-bound validation layer:
//! no I/O, no store access. A [`ValidationBuilder`] walks one entity
//! instance, recursing into owned children and collections, and produces a
//! flat list of [`ValidationResult`]s whose [`PropertyPath`]s
//! (`names[2].native_name`) API layers hand straight back to clients as
//! field identifiers.
//!
//! Null handling is deliberate and uniform: one missing-value result per
//! missing non-nullable property per pass, rules on missing values
//! skipped, null collection elements reported individually while their
//! siblings are still validated.
//!
//! # Who Uses This Crate
//!
//! Entity types implement [`ValidateOwned`]; request handlers call
//! [`validate_entity`] before anything reaches a save batch.

pub mod builder;
pub mod owned;
pub mod result;

pub use builder::{NULL_ELEMENT_MESSAGE, NULL_VALUE_MESSAGE, PropertyRules, ValidationBuilder};
pub use owned::{ValidateOwned, validate_entity};
pub use result::{PathSegment, PropertyPath, ValidationResult};
