//! Capability contracts.
//!
//! A capability is a marker contract an entity type opts into. Conventions
//! and save triggers key off the capability set alone, so shared behavior
//! (soft delete filters, audit columns, translation wiring) never has to be
//! hand-written per entity.
//!
//! Capabilities are declared at entity registration time and enumerated
//! closed-world: there is no runtime scanning, and lookups never depend on
//! any discovery order.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::descriptor::SchemaModel;
use crate::error::{Error, Result};

/// A capability an entity type declares, with its payload where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Entity carries created/updated audit timestamps.
    Audit,
    /// Entity is soft-deleted via an `is_soft_deleted` flag and filtered
    /// out of ordinary queries.
    SoftDelete,
    /// Entity carries a store-generated concurrency token.
    RowVersion,
    /// Entity is a translation of `reference` into some language.
    Translation {
        /// Name of the translated reference entity.
        reference: &'static str,
    },
    /// Entity exposes a client-visible public identifier.
    PublicId,
    /// Entity has no identity outside `owner`.
    Owned {
        /// Name of the owning entity.
        owner: &'static str,
    },
}

/// Payload-free discriminant of a [`Capability`], used for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityTag {
    /// See [`Capability::Audit`].
    Audit,
    /// See [`Capability::SoftDelete`].
    SoftDelete,
    /// See [`Capability::RowVersion`].
    RowVersion,
    /// See [`Capability::Translation`].
    Translation,
    /// See [`Capability::PublicId`].
    PublicId,
    /// See [`Capability::Owned`].
    Owned,
}

impl Capability {
    /// The payload-free tag for this capability.
    #[must_use]
    pub const fn tag(&self) -> CapabilityTag {
        match self {
            Capability::Audit => CapabilityTag::Audit,
            Capability::SoftDelete => CapabilityTag::SoftDelete,
            Capability::RowVersion => CapabilityTag::RowVersion,
            Capability::Translation { .. } => CapabilityTag::Translation,
            Capability::PublicId => CapabilityTag::PublicId,
            Capability::Owned { .. } => CapabilityTag::Owned,
        }
    }
}

/// The declared capability set of one entity type.
///
/// Small, ordered, deduplicated by tag: declaring the same capability twice
/// keeps the first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    caps: Vec<Capability>,
}

impl CapabilitySet {
    /// An empty capability set.
    #[must_use]
    pub const fn new() -> Self {
        Self { caps: Vec::new() }
    }

    /// Declare a capability. A second declaration with the same tag is
    /// ignored.
    pub fn declare(&mut self, capability: Capability) {
        if !self.has(capability.tag()) {
            self.caps.push(capability);
        }
    }

    /// True if a capability with this tag is declared.
    #[must_use]
    pub fn has(&self, tag: CapabilityTag) -> bool {
        self.caps.iter().any(|c| c.tag() == tag)
    }

    /// The declared capability for this tag, payload included.
    #[must_use]
    pub fn get(&self, tag: CapabilityTag) -> Option<&Capability> {
        self.caps.iter().find(|c| c.tag() == tag)
    }

    /// Iterate declared capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.caps.iter()
    }

    /// Number of declared capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.caps.len()
    }

    /// True if no capability is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

/// Process-wide, read-mostly map from entity name to capability set.
///
/// Populated once per distinct entity when a frozen model is published and
/// never mutated afterwards; concurrent reads are cheap. Hosts use it to
/// answer capability questions without holding the schema model itself.
#[derive(Debug)]
pub struct CapabilityRegistry {
    entries: RwLock<HashMap<String, CapabilitySet>>,
}

impl CapabilityRegistry {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Publish every entity of a frozen model.
    ///
    /// Re-publishing an entity with an identical capability set is a no-op.
    /// Publishing a *different* set for an already-known entity is a
    /// configuration error: the closed world was enumerated wrong.
    pub fn publish(&self, model: &SchemaModel) -> Result<()> {
        let mut entries = self.entries.write().expect("capability registry poisoned");
        for entity in model.entities() {
            match entries.get(entity.name()) {
                None => {
                    tracing::debug!(
                        entity = entity.name(),
                        capabilities = entity.capabilities().len(),
                        "published capability set"
                    );
                    entries.insert(entity.name().to_string(), entity.capabilities().clone());
                }
                Some(existing) if existing == entity.capabilities() => {}
                Some(_) => {
                    return Err(Error::configuration(format!(
                        "entity '{}' already registered with a different capability set",
                        entity.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// The published capability set for an entity, if any.
    #[must_use]
    pub fn capabilities_of(&self, entity: &str) -> Option<CapabilitySet> {
        self.entries
            .read()
            .expect("capability registry poisoned")
            .get(entity)
            .cloned()
    }

    /// True if the named entity is published with the given capability tag.
    #[must_use]
    pub fn entity_has(&self, entity: &str, tag: CapabilityTag) -> bool {
        self.entries
            .read()
            .expect("capability registry poisoned")
            .get(entity)
            .is_some_and(|set| set.has(tag))
    }
}

/// Global capability registry singleton.
pub fn capability_registry() -> &'static CapabilityRegistry {
    static REGISTRY: OnceLock<CapabilityRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CapabilityRegistry::new)
}
