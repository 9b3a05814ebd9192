//! Drops getter-only members before anything else looks at the model.

use mediamodel_core::{EntityDescriptor, Result, SchemaModel};

use crate::convention::{ConventionPhase, EntityConvention};

/// Removes every `read_only` property from every entity.
///
/// Runs earliest in the pre phase so a computed getter-only member can
/// never be mistaken for a column or a duplicate relationship by any later
/// convention.
#[derive(Debug, Default)]
pub struct IgnoreReadOnlyConvention;

impl EntityConvention for IgnoreReadOnlyConvention {
    fn name(&self) -> &'static str {
        "ignore_read_only"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PreModel
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.properties().iter().any(|p| p.read_only)
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        let before = entity.properties().len();
        entity.retain_properties(|p| !p.read_only);
        tracing::debug!(
            entity = entity_name,
            removed = before - entity.properties().len(),
            "ignored read-only members"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediamodel_core::{PropertyDescriptor, PropertyType};

    #[test]
    fn test_read_only_members_are_removed() {
        let mut model = SchemaModel::new();
        let mut entity = EntityDescriptor::new("anime", "animes");
        entity
            .add_property(PropertyDescriptor::new("id", PropertyType::BigInt).key(true))
            .unwrap();
        entity
            .add_property(
                PropertyDescriptor::new("display_title", PropertyType::Text).read_only(true),
            )
            .unwrap();
        model.add_entity(entity).unwrap();

        let convention = IgnoreReadOnlyConvention;
        assert!(convention.applies_to(model.entity("anime").unwrap()));
        convention.configure(&mut model, "anime").unwrap();

        let entity = model.entity("anime").unwrap();
        assert!(entity.property("display_title").is_none());
        assert!(entity.property("id").is_some());
        assert!(!convention.applies_to(entity));
    }
}
