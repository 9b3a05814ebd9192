//! Convention discovery and instantiation.
//!
//! Conventions are registered statically in [`ConventionModule`]s (one per
//! crate or feature area). The provider walks the modules, filters by
//! contract, and instantiates through a [`ConventionFactory`]. Instantiation
//! is all-or-nothing: a registered convention that cannot be constructed, or
//! that declares no contract, is a configuration bug and aborts the whole
//! discovery rather than being silently skipped.

use mediamodel_core::{Error, Result};

use crate::convention::{EntityConvention, TypeConvention};

/// The contract a registered convention declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionContract {
    /// Entity convention, pre-mapping phase.
    PreModel,
    /// Entity convention, post-mapping phase.
    PostModel,
    /// Type convention, applied property by property.
    TypeWide,
}

/// Zero-argument constructor for a registered convention.
#[derive(Clone, Copy)]
pub enum ConventionCtor {
    /// Builds an entity convention.
    Entity(fn() -> Box<dyn EntityConvention>),
    /// Builds a type convention.
    Type(fn() -> Box<dyn TypeConvention>),
}

impl std::fmt::Debug for ConventionCtor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConventionCtor::Entity(_) => f.write_str("ConventionCtor::Entity"),
            ConventionCtor::Type(_) => f.write_str("ConventionCtor::Type"),
        }
    }
}

/// Static registration record for one convention type.
///
/// A descriptor without a constructor models an abstract base; a descriptor
/// without a contract models a type registered by mistake. Both are
/// rejected at instantiation time.
#[derive(Debug, Clone)]
pub struct ConventionDescriptor {
    name: &'static str,
    contract: Option<ConventionContract>,
    ctor: Option<ConventionCtor>,
}

impl ConventionDescriptor {
    /// Start a descriptor with neither contract nor constructor.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            contract: None,
            ctor: None,
        }
    }

    /// Shorthand for a concrete entity convention.
    #[must_use]
    pub fn entity(
        name: &'static str,
        contract: ConventionContract,
        ctor: fn() -> Box<dyn EntityConvention>,
    ) -> Self {
        Self {
            name,
            contract: Some(contract),
            ctor: Some(ConventionCtor::Entity(ctor)),
        }
    }

    /// Shorthand for a concrete type convention.
    #[must_use]
    pub fn type_wide(name: &'static str, ctor: fn() -> Box<dyn TypeConvention>) -> Self {
        Self {
            name,
            contract: Some(ConventionContract::TypeWide),
            ctor: Some(ConventionCtor::Type(ctor)),
        }
    }

    /// Declare the contract.
    #[must_use]
    pub fn with_contract(mut self, contract: ConventionContract) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Declare the constructor.
    #[must_use]
    pub fn with_ctor(mut self, ctor: ConventionCtor) -> Self {
        self.ctor = Some(ctor);
        self
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared contract, if any.
    #[must_use]
    pub fn contract(&self) -> Option<ConventionContract> {
        self.contract
    }

    /// Constructor, if the type is concrete.
    #[must_use]
    pub fn ctor(&self) -> Option<ConventionCtor> {
        self.ctor
    }
}

/// A named group of convention registrations.
#[derive(Debug, Clone, Default)]
pub struct ConventionModule {
    name: &'static str,
    descriptors: Vec<ConventionDescriptor>,
}

impl ConventionModule {
    /// Create an empty module.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            descriptors: Vec::new(),
        }
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a descriptor.
    #[must_use]
    pub fn register(mut self, descriptor: ConventionDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// All registered descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &[ConventionDescriptor] {
        &self.descriptors
    }
}

/// Builds convention instances from descriptors.
///
/// The default factory calls the registered zero-argument constructor.
/// Hosts with a dependency container can supply their own factory and
/// resolve instances out of the container instead.
pub trait ConventionFactory {
    /// Build an entity convention.
    fn create_entity(&self, descriptor: &ConventionDescriptor)
        -> Result<Box<dyn EntityConvention>>;

    /// Build a type convention.
    fn create_type(&self, descriptor: &ConventionDescriptor) -> Result<Box<dyn TypeConvention>>;
}

/// Factory using each descriptor's registered constructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConventionFactory;

impl ConventionFactory for DefaultConventionFactory {
    fn create_entity(
        &self,
        descriptor: &ConventionDescriptor,
    ) -> Result<Box<dyn EntityConvention>> {
        match descriptor.ctor() {
            Some(ConventionCtor::Entity(ctor)) => Ok(ctor()),
            Some(ConventionCtor::Type(_)) => Err(Error::configuration(format!(
                "convention '{}' is registered as a type convention, not an entity convention",
                descriptor.name()
            ))),
            None => Err(Error::configuration(format!(
                "convention '{}' is abstract and cannot be instantiated",
                descriptor.name()
            ))),
        }
    }

    fn create_type(&self, descriptor: &ConventionDescriptor) -> Result<Box<dyn TypeConvention>> {
        match descriptor.ctor() {
            Some(ConventionCtor::Type(ctor)) => Ok(ctor()),
            Some(ConventionCtor::Entity(_)) => Err(Error::configuration(format!(
                "convention '{}' is registered as an entity convention, not a type convention",
                descriptor.name()
            ))),
            None => Err(Error::configuration(format!(
                "convention '{}' is abstract and cannot be instantiated",
                descriptor.name()
            ))),
        }
    }
}

/// Discovers and instantiates conventions across a set of modules.
#[derive(Debug, Clone, Default)]
pub struct ConventionProvider {
    modules: Vec<ConventionModule>,
}

impl ConventionProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to scan.
    #[must_use]
    pub fn with_module(mut self, module: ConventionModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Every descriptor declaring a pre- or post-model contract.
    #[must_use]
    pub fn discover_entity_conventions(&self) -> Vec<&ConventionDescriptor> {
        self.descriptors()
            .filter(|d| {
                matches!(
                    d.contract(),
                    Some(ConventionContract::PreModel | ConventionContract::PostModel)
                )
            })
            .collect()
    }

    /// Every descriptor declaring the type-wide contract.
    #[must_use]
    pub fn discover_type_conventions(&self) -> Vec<&ConventionDescriptor> {
        self.descriptors()
            .filter(|d| matches!(d.contract(), Some(ConventionContract::TypeWide)))
            .collect()
    }

    /// Instantiate entity conventions, failing fast on the first descriptor
    /// with no contract or no constructor.
    pub fn instantiate_entity_conventions(
        &self,
        descriptors: &[&ConventionDescriptor],
        factory: &dyn ConventionFactory,
    ) -> Result<Vec<Box<dyn EntityConvention>>> {
        let mut out = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            Self::require_contract(descriptor)?;
            out.push(factory.create_entity(descriptor)?);
        }
        Ok(out)
    }

    /// Instantiate type conventions with the same fail-fast semantics.
    pub fn instantiate_type_conventions(
        &self,
        descriptors: &[&ConventionDescriptor],
        factory: &dyn ConventionFactory,
    ) -> Result<Vec<Box<dyn TypeConvention>>> {
        let mut out = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            Self::require_contract(descriptor)?;
            out.push(factory.create_type(descriptor)?);
        }
        Ok(out)
    }

    fn require_contract(descriptor: &ConventionDescriptor) -> Result<()> {
        if descriptor.contract().is_none() {
            return Err(Error::configuration(format!(
                "convention '{}' declares no convention contract",
                descriptor.name()
            )));
        }
        Ok(())
    }

    fn descriptors(&self) -> impl Iterator<Item = &ConventionDescriptor> {
        self.modules.iter().flat_map(|m| m.descriptors().iter())
    }
}
