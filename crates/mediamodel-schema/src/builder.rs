//! The model build pipeline.

use mediamodel_core::{EntityDescriptor, Result, SchemaModel};

use crate::convention::{ConventionPhase, EntityConvention, TypeConvention};
use crate::conventions::catalog_module;
use crate::provider::{ConventionFactory, ConventionProvider, DefaultConventionFactory};

type MappingFn = Box<dyn FnOnce(&mut SchemaModel) -> Result<()>>;

/// Builds a frozen [`SchemaModel`] from entity registrations, explicit
/// mapping closures, and conventions.
///
/// The pipeline order is fixed: pre-phase entity conventions, explicit
/// mapping, type conventions, post-phase entity conventions, freeze.
/// Within a phase, conventions run by ascending priority, then
/// registration order; each runs at most once per matching entity per
/// build. The frozen model is typically wrapped in an `Arc` and its
/// capability sets published to the process-wide registry by the host.
pub struct ModelBuilder {
    entities: Vec<EntityDescriptor>,
    mappings: Vec<MappingFn>,
    entity_conventions: Vec<Box<dyn EntityConvention>>,
    type_conventions: Vec<Box<dyn TypeConvention>>,
}

impl ModelBuilder {
    /// Start an empty build.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            mappings: Vec::new(),
            entity_conventions: Vec::new(),
            type_conventions: Vec::new(),
        }
    }

    /// Register an entity type. Duplicates surface at build time.
    #[must_use]
    pub fn entity(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.push(descriptor);
        self
    }

    /// Register an explicit mapping closure, run after the pre phase.
    #[must_use]
    pub fn map(mut self, f: impl FnOnce(&mut SchemaModel) -> Result<()> + 'static) -> Self {
        self.mappings.push(Box::new(f));
        self
    }

    /// Register a single entity convention.
    #[must_use]
    pub fn convention(mut self, convention: Box<dyn EntityConvention>) -> Self {
        self.entity_conventions.push(convention);
        self
    }

    /// Register a single type convention.
    #[must_use]
    pub fn type_convention(mut self, convention: Box<dyn TypeConvention>) -> Self {
        self.type_conventions.push(convention);
        self
    }

    /// Discover and instantiate every convention a provider knows about.
    /// Fails fast on abstract or contract-less registrations.
    pub fn conventions_from(
        mut self,
        provider: &ConventionProvider,
        factory: &dyn ConventionFactory,
    ) -> Result<Self> {
        let entity_descriptors = provider.discover_entity_conventions();
        let type_descriptors = provider.discover_type_conventions();
        self.entity_conventions
            .extend(provider.instantiate_entity_conventions(&entity_descriptors, factory)?);
        self.type_conventions
            .extend(provider.instantiate_type_conventions(&type_descriptors, factory)?);
        Ok(self)
    }

    /// Shorthand: the full catalog convention set with the default factory.
    pub fn with_catalog_conventions(self) -> Result<Self> {
        let provider = ConventionProvider::new().with_module(catalog_module());
        self.conventions_from(&provider, &DefaultConventionFactory)
    }

    /// Run the pipeline and freeze the result.
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<SchemaModel> {
        let mut model = SchemaModel::new();
        for entity in self.entities {
            model.add_entity(entity)?;
        }

        Self::run_phase(
            &self.entity_conventions,
            ConventionPhase::PreModel,
            &mut model,
        )?;

        for mapping in self.mappings {
            mapping(&mut model)?;
        }

        for entity_name in model.entity_names() {
            let entity = model.entity_mut(&entity_name)?;
            for convention in &self.type_conventions {
                for property in entity.properties_mut() {
                    convention.configure_property(&entity_name, property)?;
                }
            }
        }

        Self::run_phase(
            &self.entity_conventions,
            ConventionPhase::PostModel,
            &mut model,
        )?;

        model.freeze();
        tracing::info!(
            entities = model.entities().len(),
            sequences = model.sequences().len(),
            "schema model built and frozen"
        );
        Ok(model)
    }

    fn run_phase(
        conventions: &[Box<dyn EntityConvention>],
        phase: ConventionPhase,
        model: &mut SchemaModel,
    ) -> Result<()> {
        let mut ordered: Vec<&dyn EntityConvention> = conventions
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| c.phase() == phase)
            .collect();
        ordered.sort_by_key(|c| c.priority());

        for convention in ordered {
            for entity_name in model.entity_names() {
                let applies = model
                    .entity(&entity_name)
                    .is_some_and(|e| convention.applies_to(e));
                if !applies {
                    continue;
                }
                tracing::debug!(
                    convention = convention.name(),
                    entity = entity_name,
                    ?phase,
                    "applying convention"
                );
                convention.configure(model, &entity_name)?;
            }
        }
        Ok(())
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
