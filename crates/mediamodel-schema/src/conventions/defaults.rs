//! Zero-value column defaults.

use mediamodel_core::{
    EntityDescriptor, PropertyType, Result, SchemaModel, ValueGeneration,
};

use crate::convention::{ConventionPhase, EntityConvention};

/// Gives plain required columns a zero-value default (`FALSE` for
/// booleans, `0` for numerics) so inserts omitting them succeed.
///
/// Keys and index members never receive an artificial default; a colliding
/// zero there would defeat the index. Runs last in the post phase so the
/// indexes added by earlier conventions are visible.
#[derive(Debug, Default)]
pub struct DefaultValueConvention;

impl EntityConvention for DefaultValueConvention {
    fn name(&self) -> &'static str {
        "default_value"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PostModel
    }

    fn priority(&self) -> i32 {
        50
    }

    fn applies_to(&self, _entity: &EntityDescriptor) -> bool {
        true
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        let candidates: Vec<String> = entity
            .properties()
            .iter()
            .filter(|p| {
                !p.nullable
                    && p.default.is_none()
                    && p.computed.is_none()
                    && p.value_generation == ValueGeneration::Never
                    && (p.declared_type == PropertyType::Bool || p.declared_type.is_numeric())
            })
            .map(|p| p.name.clone())
            .filter(|name| !entity.is_key_or_indexed(name))
            .collect();

        for name in candidates {
            if let Some(property) = entity.property_mut(&name) {
                property.default = Some(match property.declared_type {
                    PropertyType::Bool => "FALSE".to_string(),
                    _ => "0".to_string(),
                });
            }
        }
        Ok(())
    }
}
