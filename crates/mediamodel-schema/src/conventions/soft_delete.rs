//! Soft-delete query filters.
//!
//! Two conventions, phase-ordered by priority. Synthesis (priority 10)
//! maps the `is_soft_deleted` flag and sets the base filter; combination
//! (priority 20) ANDs a clause for every navigation pointing at another
//! soft-deletable entity, so a row is hidden the moment anything it hangs
//! off gets soft-deleted. Entities carrying a programmer-supplied filter
//! are never touched by either.

use mediamodel_core::{
    CapabilityTag, EntityDescriptor, FilterSource, Predicate, PropertyDescriptor, PropertyType,
    Result, SchemaModel,
};

use crate::convention::{ConventionPhase, EntityConvention};

pub(crate) const SOFT_DELETE_FLAG: &str = "is_soft_deleted";

/// Maps the `is_soft_deleted` flag and synthesizes the base filter
/// `NOT is_soft_deleted`.
#[derive(Debug, Default)]
pub struct SoftDeleteFilterConvention;

impl EntityConvention for SoftDeleteFilterConvention {
    fn name(&self) -> &'static str {
        "soft_delete_filter"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PostModel
    }

    fn priority(&self) -> i32 {
        10
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        entity.capabilities().has(CapabilityTag::SoftDelete)
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let entity = model.entity_mut(entity_name)?;
        entity.ensure_property(PropertyDescriptor::new(SOFT_DELETE_FLAG, PropertyType::Bool));

        // Replaces any prior convention-sourced filter wholesale, so a
        // rebuild starts from the same base; explicit filters win.
        let filter = Predicate::not_property([SOFT_DELETE_FLAG]);
        if !entity.set_convention_filter(filter) {
            tracing::debug!(
                entity = entity_name,
                "explicit query filter present, soft-delete filter not synthesized"
            );
        }
        Ok(())
    }
}

/// ANDs `NOT <nav>.is_soft_deleted` onto the filter for every direct
/// navigation whose target entity is also soft-deletable, in navigation
/// declaration order.
#[derive(Debug, Default)]
pub struct SoftDeleteNavigationFilterConvention;

impl EntityConvention for SoftDeleteNavigationFilterConvention {
    fn name(&self) -> &'static str {
        "soft_delete_navigation_filter"
    }

    fn phase(&self) -> ConventionPhase {
        ConventionPhase::PostModel
    }

    fn priority(&self) -> i32 {
        20
    }

    fn applies_to(&self, entity: &EntityDescriptor) -> bool {
        !entity.navigations().is_empty()
    }

    fn configure(&self, model: &mut SchemaModel, entity_name: &str) -> Result<()> {
        let Some(entity) = model.entity(entity_name) else {
            return Ok(());
        };
        if matches!(entity.query_filter(), Some((_, FilterSource::Explicit))) {
            return Ok(());
        }

        // Resolve target capabilities against the model before taking the
        // mutable borrow.
        let clauses: Vec<Predicate> = entity
            .navigations()
            .iter()
            .filter(|nav| {
                model
                    .entity(&nav.target)
                    .is_some_and(|t| t.capabilities().has(CapabilityTag::SoftDelete))
            })
            .map(|nav| Predicate::not_property([nav.name.as_str(), SOFT_DELETE_FLAG]))
            .collect();
        if clauses.is_empty() {
            return Ok(());
        }

        let entity = model.entity_mut(entity_name)?;
        let mut filter = entity.query_filter().map(|(p, _)| p.clone());
        for clause in clauses {
            let already_present = filter
                .as_ref()
                .is_some_and(|f| f.contains_conjunct(&clause));
            if already_present {
                continue;
            }
            filter = Some(match filter {
                Some(existing) => existing.and(clause),
                None => clause,
            });
        }
        if let Some(filter) = filter {
            entity.set_convention_filter(filter);
        }
        Ok(())
    }
}
