//! Self-validating entities.

use crate::builder::ValidationBuilder;
use crate::result::ValidationResult;

/// An entity that knows how to validate itself.
///
/// Composition replaces inheritance here: a parent's validator calls
/// [`validate_entity`] (or recurses through the builder's owned-entity
/// methods) on each child it owns, and children stay ignorant of their
/// parents.
pub trait ValidateOwned: Sized {
    /// Declare this entity's rules on the given builder.
    fn validate_owned<'e>(&'e self, builder: &mut ValidationBuilder<'e, Self>);
}

/// Validate one entity through its [`ValidateOwned`] implementation.
#[must_use]
pub fn validate_entity<T: ValidateOwned>(entity: &T) -> Vec<ValidationResult> {
    let mut builder = ValidationBuilder::new(entity);
    entity.validate_owned(&mut builder);
    let results = builder.validate();
    tracing::debug!(
        entity = std::any::type_name::<T>(),
        failures = results.len(),
        "entity validated"
    );
    results
}
