//! Audit timestamp columns.

use mediamodel_core::{
    CapabilityTag, EntityDescriptor, PropertyDescriptor, PropertyType, Result, SchemaModel,
    ValueGeneration,
};

use crate::convention::{ConventionPhase, EntityConvention};

/// Adds `created_at` / `updated_at` to every audited entity.
///
/// Both columns are store-stamped: `created_at` defaults to the commit
/// timestamp on insert, `updated_at` is regenerated on every write. An
/// entity that already declares either column keeps its own declaration
/// untouched.
#[derive(Debug, Default)]
pub struct AuditConvention;

impl EntityConvention for AuditConvention {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PreModel
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.capabilities().has(CapabilityTag::Audit)
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        entity.ensure_property(
            PropertyDescriptor::new("created_at", PropertyType::Timestamp)
                .default_sql("CURRENT_TIMESTAMP")
                .value_generation(ValueGeneration::OnAdd),
        );
        entity.ensure_property(
            PropertyDescriptor::new("updated_at", PropertyType::Timestamp)
                .value_generation(ValueGeneration::OnAddOrUpdate),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediamodel_core::Capability;

    fn audited_entity() -> EntityDescriptor {
        let mut entity = EntityDescriptor::new("anime", "animes");
        entity.capabilities_mut().declare(Capability::Audit);
        entity
            .add_property(PropertyDescriptor::new("id", PropertyType::BigInt).key(true))
            .unwrap();
        entity
    }

    #[test]
    fn test_audit_columns_are_added() {
        let mut model = SchemaModel::new();
        model.add_entity(audited_entity()).unwrap();

        AuditConvention.configure(&mut model, "anime").unwrap();

        let entity = model.entity("anime").unwrap();
        let created = entity.property("created_at").unwrap();
        assert!(!created.nullable);
        assert_eq!(created.default.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(created.value_generation, ValueGeneration::OnAdd);
        let updated = entity.property("updated_at").unwrap();
        assert_eq!(updated.value_generation, ValueGeneration::OnAddOrUpdate);
    }

    #[test]
    fn test_declared_columns_are_left_alone() {
        let mut model = SchemaModel::new();
        let mut entity = audited_entity();
        entity
            .add_property(
                PropertyDescriptor::new("created_at", PropertyType::Timestamp).nullable(true),
            )
            .unwrap();
        model.add_entity(entity).unwrap();

        AuditConvention.configure(&mut model, "anime").unwrap();

        let entity = model.entity("anime").unwrap();
        // Pre-declared column keeps its own nullability.
        assert!(entity.property("created_at").unwrap().nullable);
        assert!(entity.property("updated_at").is_some());
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut model = SchemaModel::new();
        model.add_entity(audited_entity()).unwrap();

        AuditConvention.configure(&mut model, "anime").unwrap();
        let first = model.entity("anime").unwrap().clone();
        AuditConvention.configure(&mut model, "anime").unwrap();
        assert_eq!(model.entity("anime").unwrap(), &first);
    }

    #[test]
    fn test_skips_unaudited_entities() {
        let entity = EntityDescriptor::new("language", "languages");
        assert!(!AuditConvention.applies_to(&entity));
    }
}
