//! Standard translation mapping.

use mediamodel_core::{
    Capability, CapabilityTag, DeleteBehavior, EntityDescriptor, NavigationDescriptor,
    PropertyDescriptor, PropertyType, Result, SchemaModel,
};

use crate::convention::{ConventionPhase, EntityConvention};

const TRANSLATION_MAX_LENGTH: u32 = 500;

/// Maps every translation entity the same way: a required cascade
/// navigation to the translated reference entity, a required cascade
/// navigation to `language`, and the bounded `translation` text column.
///
/// Entities deriving from the canonical translation base already carry this
/// mapping and are skipped.
#[derive(Debug, Default)]
pub struct TranslationConvention;

impl EntityConvention for TranslationConvention {
    fn name(&self) -> &'static str {
        "translation"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PreModel
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.capabilities().has(CapabilityTag::Translation) && !entity.uses_translation_base()
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        let Some(Capability::Translation { reference }) =
            entity.capabilities().get(CapabilityTag::Translation).cloned()
        else {
            return Ok(());
        };

        entity.ensure_navigation(
            NavigationDescriptor::new(reference, reference)
                .delete_behavior(DeleteBehavior::Cascade)
                .required(true),
        );
        entity.ensure_navigation(
            NavigationDescriptor::new("language", "language")
                .delete_behavior(DeleteBehavior::Cascade)
                .required(true),
        );
        entity.ensure_property(
            PropertyDescriptor::new("translation", PropertyType::Text)
                .max_length(TRANSLATION_MAX_LENGTH),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_entity() -> EntityDescriptor {
        let mut entity = EntityDescriptor::new("anime_title", "anime_titles");
        entity
            .capabilities_mut()
            .declare(Capability::Translation { reference: "anime" });
        entity
    }

    #[test]
    fn test_translation_mapping_is_applied() {
        let mut model = SchemaModel::new();
        model.add_entity(translation_entity()).unwrap();

        TranslationConvention
            .configure(&mut model, "anime_title")
            .unwrap();

        let entity = model.entity("anime_title").unwrap();
        let reference = entity.navigation("anime").unwrap();
        assert_eq!(reference.target, "anime");
        assert_eq!(reference.delete_behavior, DeleteBehavior::Cascade);
        assert!(reference.required);

        let language = entity.navigation("language").unwrap();
        assert_eq!(language.target, "language");
        assert!(language.required);

        let translation = entity.property("translation").unwrap();
        assert_eq!(translation.max_length, Some(500));
        assert!(!translation.nullable);
    }

    #[test]
    fn test_canonical_base_is_skipped() {
        let mut entity = translation_entity();
        entity.set_uses_translation_base(true);
        assert!(!TranslationConvention.applies_to(&entity));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut model = SchemaModel::new();
        model.add_entity(translation_entity()).unwrap();

        TranslationConvention
            .configure(&mut model, "anime_title")
            .unwrap();
        let first = model.entity("anime_title").unwrap().clone();
        TranslationConvention
            .configure(&mut model, "anime_title")
            .unwrap();
        assert_eq!(model.entity("anime_title").unwrap(), &first);
    }
}
