//! Optimistic concurrency token column.

use mediamodel_core::{
    CapabilityTag, EntityDescriptor, PropertyDescriptor, PropertyType, Result, SchemaModel,
    ValueGeneration,
};

use crate::convention::{ConventionPhase, EntityConvention};

/// Adds a store-stamped `row_version` concurrency token to every entity
/// declaring the row-version capability. A pre-declared `row_version`
/// property is left untouched.
#[derive(Debug, Default)]
pub struct RowVersionConvention;

impl EntityConvention for RowVersionConvention {
    fn name(&self) -> &'static str {
        "row_version"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PreModel
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.capabilities().has(CapabilityTag::RowVersion)
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        entity.ensure_property(
            PropertyDescriptor::new("row_version", PropertyType::Bytes)
                .concurrency_token(true)
                .value_generation(ValueGeneration::OnAddOrUpdate),
        );
        Ok(())
    }
}
