//! Public identifier mapping.

use mediamodel_core::{
    CapabilityTag, EntityDescriptor, Error, PropertyType, Result, SchemaModel, SequenceDescriptor,
    ValueGeneration,
};

use crate::convention::{ConventionPhase, EntityConvention};

pub(crate) const PUBLIC_ID: &str = "public_id";

/// Configures the externally-visible `public_id` of every entity declaring
/// the public-id capability.
///
/// GUID ids are client-generated (non-sequential, safe to hand out before
/// the insert). Integer ids draw from a per-table sequence so the store
/// assigns them in one round trip. Any other declared type is a model bug
/// and fails the build. A unique index backs the lookup path either way.
#[derive(Debug, Default)]
pub struct PublicIdConvention;

impl EntityConvention for PublicIdConvention {
    fn name(&self) -> &'static str {
        "public_id"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PostModel
    }

    fn priority(&self) -> i32 {
        30
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.capabilities().has(CapabilityTag::PublicId)
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        let table = entity.table().to_string();
        let Some(declared_type) = entity.property(PUBLIC_ID).map(|p| p.declared_type) else {
            return Err(Error::configuration(format!(
                "entity '{entity_name}' declares the public-id capability \
                 but no '{PUBLIC_ID}' property"
            )));
        };

        let sequence = match declared_type {
            PropertyType::Uuid => {
                if let Some(property) = entity.property_mut(PUBLIC_ID) {
                    property.nullable = false;
                    property.value_generation = ValueGeneration::ClientGuid;
                }
                None
            }
            t if t.is_integer() => {
                let sequence_name = format!("seq_{table}_{PUBLIC_ID}");
                if let Some(property) = entity.property_mut(PUBLIC_ID) {
                    property.nullable = false;
                    property.value_generation = ValueGeneration::SequenceNext;
                    property.default = Some(format!("NEXT VALUE FOR {sequence_name}"));
                }
                Some(sequence_name)
            }
            other => {
                return Err(Error::configuration(format!(
                    "entity '{entity_name}' maps '{PUBLIC_ID}' as {other:?}; \
                     only Uuid and integer types are supported"
                )));
            }
        };

        entity.ensure_index(mediamodel_core::IndexDescriptor::new(
            format!("ux_{table}_{PUBLIC_ID}"),
            vec![PUBLIC_ID.to_string()],
            true,
        ));
        if let Some(sequence_name) = sequence {
            model.ensure_sequence(SequenceDescriptor::new(sequence_name))?;
        }
        Ok(())
    }
}
