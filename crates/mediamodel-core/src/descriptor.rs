//! Entity type descriptors and the in-memory schema model.
//!
//! An [`EntityDescriptor`] is the read/write view of one business entity
//! type's schema: its properties, navigations, indexes, and (at most one)
//! query filter. Descriptors are created once per modeled type at build
//! time, mutated by every applicable convention, and frozen once building
//! completes. After [`SchemaModel::freeze`], every mutator path reports a
//! configuration error and the model may be shared read-only across
//! concurrent callers.

use crate::capability::CapabilitySet;
use crate::error::{Error, Result};
use crate::expr::Predicate;

/// Declared scalar type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// Boolean flag.
    Bool,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Floating point.
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// Character data.
    Text,
    /// Raw bytes.
    Bytes,
    /// Calendar date.
    Date,
    /// Point in time.
    Timestamp,
    /// UUID.
    Uuid,
}

impl PropertyType {
    /// True for the integer widths a sequence can back.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            PropertyType::SmallInt | PropertyType::Int | PropertyType::BigInt
        )
    }

    /// True for types the default-value convention zero-fills.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            PropertyType::SmallInt
                | PropertyType::Int
                | PropertyType::BigInt
                | PropertyType::Double
                | PropertyType::Decimal
        )
    }
}

/// How a property's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueGeneration {
    /// Caller supplies the value.
    #[default]
    Never,
    /// Store generates on insert.
    OnAdd,
    /// Store generates on insert and on every update (concurrency tokens,
    /// updated-at stamps).
    OnAddOrUpdate,
    /// Client generates a non-sequential GUID at insert time.
    ClientGuid,
    /// Store draws the next value from a dedicated sequence.
    SequenceNext,
}

/// Delete behavior of a navigation's underlying foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteBehavior {
    /// Raise if references remain.
    #[default]
    NoAction,
    /// Same as no-action, kept for store dialects that distinguish them.
    Restrict,
    /// Delete referencing rows.
    Cascade,
    /// Null the referencing column.
    SetNull,
}

/// Multiplicity of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// Reference navigation.
    One,
    /// Collection navigation.
    Many,
}

/// Where an entity's query filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// Programmer-supplied in explicit mapping code. Never overwritten.
    Explicit,
    /// Synthesized by a convention. Rebuilt freely on every model build.
    Convention,
}

/// Metadata about one property of an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,
    /// Declared scalar type.
    pub declared_type: PropertyType,
    /// Whether the column admits NULL.
    pub nullable: bool,
    /// Default value expression (SQL).
    pub default: Option<String>,
    /// Computed-column expression, if this is not a stored column.
    pub computed: Option<String>,
    /// Whether this property participates in optimistic concurrency.
    pub concurrency_token: bool,
    /// How the value is produced.
    pub value_generation: ValueGeneration,
    /// Whether character data is Unicode. Meaningless for non-text types.
    pub unicode: bool,
    /// Maximum length for character data.
    pub max_length: Option<u32>,
    /// True for getter-only members: excluded from schema discovery.
    pub read_only: bool,
    /// True if part of the primary key.
    pub key: bool,
}

impl PropertyDescriptor {
    /// Create a property with the defaults explicit mapping would get.
    pub fn new(name: impl Into<String>, declared_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            nullable: false,
            default: None,
            computed: None,
            concurrency_token: false,
            value_generation: ValueGeneration::default(),
            unicode: true,
            max_length: None,
            read_only: false,
            key: false,
        }
    }

    /// Set nullability.
    #[must_use]
    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set the default value expression.
    #[must_use]
    pub fn default_sql(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Set a computed-column expression.
    #[must_use]
    pub fn computed(mut self, expr: impl Into<String>) -> Self {
        self.computed = Some(expr.into());
        self
    }

    /// Flag as concurrency token.
    #[must_use]
    pub fn concurrency_token(mut self, value: bool) -> Self {
        self.concurrency_token = value;
        self
    }

    /// Set value generation.
    #[must_use]
    pub fn value_generation(mut self, value: ValueGeneration) -> Self {
        self.value_generation = value;
        self
    }

    /// Set the Unicode flag for character data.
    #[must_use]
    pub fn unicode(mut self, value: bool) -> Self {
        self.unicode = value;
        self
    }

    /// Set the maximum character length.
    #[must_use]
    pub fn max_length(mut self, value: u32) -> Self {
        self.max_length = Some(value);
        self
    }

    /// Flag as getter-only.
    #[must_use]
    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    /// Flag as part of the primary key.
    #[must_use]
    pub fn key(mut self, value: bool) -> Self {
        self.key = value;
        self
    }
}

/// Metadata about one navigation relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDescriptor {
    /// Navigation name on the declaring entity.
    pub name: String,
    /// Target entity name.
    pub target: String,
    /// Reference or collection.
    pub multiplicity: Multiplicity,
    /// Foreign-key delete behavior.
    pub delete_behavior: DeleteBehavior,
    /// Whether the relationship is required.
    pub required: bool,
}

impl NavigationDescriptor {
    /// Create a reference navigation with default delete behavior.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            multiplicity: Multiplicity::One,
            delete_behavior: DeleteBehavior::default(),
            required: false,
        }
    }

    /// Set multiplicity.
    #[must_use]
    pub fn multiplicity(mut self, value: Multiplicity) -> Self {
        self.multiplicity = value;
        self
    }

    /// Set delete behavior.
    #[must_use]
    pub fn delete_behavior(mut self, value: DeleteBehavior) -> Self {
        self.delete_behavior = value;
        self
    }

    /// Set requiredness.
    #[must_use]
    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }
}

/// One index over an entity's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Index name, unique within the entity.
    pub name: String,
    /// Indexed property names, in order.
    pub properties: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexDescriptor {
    /// Create an index.
    pub fn new(name: impl Into<String>, properties: Vec<String>, unique: bool) -> Self {
        Self {
            name: name.into(),
            properties,
            unique,
        }
    }
}

/// A store-side monotonic sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDescriptor {
    /// Sequence name, unique within the model.
    pub name: String,
    /// First value.
    pub start: i64,
    /// Step between values.
    pub increment: i64,
}

impl SequenceDescriptor {
    /// Create a sequence starting at 1, stepping by 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: 1,
            increment: 1,
        }
    }
}

/// Read/write schema view of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    table: String,
    capabilities: CapabilitySet,
    properties: Vec<PropertyDescriptor>,
    navigations: Vec<NavigationDescriptor>,
    indexes: Vec<IndexDescriptor>,
    query_filter: Option<(Predicate, FilterSource)>,
    uses_translation_base: bool,
}

impl EntityDescriptor {
    /// Create a descriptor for an entity mapped to `table`.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            capabilities: CapabilitySet::new(),
            properties: Vec::new(),
            navigations: Vec::new(),
            indexes: Vec::new(),
            query_filter: None,
            uses_translation_base: false,
        }
    }

    /// Entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Mutable capability set, for registration code.
    pub fn capabilities_mut(&mut self) -> &mut CapabilitySet {
        &mut self.capabilities
    }

    /// Flag this entity as deriving from the canonical translation base
    /// (which already wires up the standard translation mapping).
    pub fn set_uses_translation_base(&mut self, value: bool) {
        self.uses_translation_base = value;
    }

    /// True if the canonical translation base does the mapping already.
    #[must_use]
    pub fn uses_translation_base(&self) -> bool {
        self.uses_translation_base
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// All properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Mutable property lookup.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyDescriptor> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Iterate all properties mutably, for type-wide configuration passes.
    pub fn properties_mut(&mut self) -> impl Iterator<Item = &mut PropertyDescriptor> {
        self.properties.iter_mut()
    }

    /// Add a property; duplicate names are a configuration error.
    pub fn add_property(&mut self, property: PropertyDescriptor) -> Result<()> {
        if self.property(&property.name).is_some() {
            return Err(Error::configuration(format!(
                "entity '{}' already declares property '{}'",
                self.name, property.name
            )));
        }
        self.properties.push(property);
        Ok(())
    }

    /// Add a property only if no property with that name exists yet.
    ///
    /// This is the idempotent form conventions use: re-running a convention
    /// over an already-configured model must not duplicate anything.
    pub fn ensure_property(&mut self, property: PropertyDescriptor) -> &mut PropertyDescriptor {
        let at = match self.properties.iter().position(|p| p.name == property.name) {
            Some(existing) => existing,
            None => {
                self.properties.push(property);
                self.properties.len() - 1
            }
        };
        &mut self.properties[at]
    }

    /// Drop every property failing the predicate.
    pub fn retain_properties(&mut self, keep: impl Fn(&PropertyDescriptor) -> bool) {
        self.properties.retain(|p| keep(p));
    }

    // ========================================================================
    // Navigations
    // ========================================================================

    /// All navigations in declaration order.
    #[must_use]
    pub fn navigations(&self) -> &[NavigationDescriptor] {
        &self.navigations
    }

    /// Look up a navigation by name.
    #[must_use]
    pub fn navigation(&self, name: &str) -> Option<&NavigationDescriptor> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Add a navigation; duplicate names are a configuration error.
    pub fn add_navigation(&mut self, navigation: NavigationDescriptor) -> Result<()> {
        if self.navigation(&navigation.name).is_some() {
            return Err(Error::configuration(format!(
                "entity '{}' already declares navigation '{}'",
                self.name, navigation.name
            )));
        }
        self.navigations.push(navigation);
        Ok(())
    }

    /// Add a navigation only if absent (idempotent convention form).
    pub fn ensure_navigation(&mut self, navigation: NavigationDescriptor) {
        if self.navigation(&navigation.name).is_none() {
            self.navigations.push(navigation);
        }
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    /// All indexes.
    #[must_use]
    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    /// Add an index only if no index with that name exists (idempotent).
    pub fn ensure_index(&mut self, index: IndexDescriptor) {
        if !self.indexes.iter().any(|i| i.name == index.name) {
            self.indexes.push(index);
        }
    }

    /// True if the named property is part of the key or any index.
    ///
    /// The default-value convention uses this to skip properties where an
    /// artificial default could collide.
    #[must_use]
    pub fn is_key_or_indexed(&self, property: &str) -> bool {
        if self.property(property).is_some_and(|p| p.key) {
            return true;
        }
        self.indexes
            .iter()
            .any(|i| i.properties.iter().any(|p| p == property))
    }

    // ========================================================================
    // Query filter
    // ========================================================================

    /// The entity's query filter, if any, with its source.
    #[must_use]
    pub fn query_filter(&self) -> Option<(&Predicate, FilterSource)> {
        self.query_filter.as_ref().map(|(p, s)| (p, *s))
    }

    /// Set a programmer-supplied filter. Replaces any previous filter: the
    /// single-filter-per-type constraint keys on explicit mapping winning.
    pub fn set_explicit_filter(&mut self, predicate: Predicate) {
        self.query_filter = Some((predicate, FilterSource::Explicit));
    }

    /// Set a convention-synthesized filter.
    ///
    /// Returns `false` without touching anything when an explicit filter is
    /// already present; a convention must never overwrite explicit mapping.
    pub fn set_convention_filter(&mut self, predicate: Predicate) -> bool {
        match &self.query_filter {
            Some((_, FilterSource::Explicit)) => false,
            _ => {
                self.query_filter = Some((predicate, FilterSource::Convention));
                true
            }
        }
    }
}

/// The in-memory schema model: every entity descriptor plus model-level
/// sequences. Mutable while building; frozen afterward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    entities: Vec<EntityDescriptor>,
    sequences: Vec<SequenceDescriptor>,
    frozen: bool,
}

impl SchemaModel {
    /// Create an empty, unfrozen model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the model has been frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the model. All later mutator calls fail with a configuration
    /// error; the frozen model may be shared read-only.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn guard_mutation(&self) -> Result<()> {
        if self.frozen {
            return Err(Error::configuration("schema model is frozen"));
        }
        Ok(())
    }

    /// Register an entity type. Duplicate names are a configuration error.
    pub fn add_entity(&mut self, entity: EntityDescriptor) -> Result<()> {
        self.guard_mutation()?;
        if self.entity(entity.name()).is_some() {
            return Err(Error::configuration(format!(
                "entity '{}' registered twice",
                entity.name()
            )));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// All entities in registration order.
    #[must_use]
    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    /// Entity names in registration order (owned; lets callers iterate
    /// while mutating descriptors through `entity_mut`).
    #[must_use]
    pub fn entity_names(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.name().to_string()).collect()
    }

    /// Look up an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name() == name)
    }

    /// Mutable entity lookup; fails on frozen models and unknown names.
    pub fn entity_mut(&mut self, name: &str) -> Result<&mut EntityDescriptor> {
        self.guard_mutation()?;
        self.entities
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| Error::configuration(format!("unknown entity '{name}'")))
    }

    /// All sequences.
    #[must_use]
    pub fn sequences(&self) -> &[SequenceDescriptor] {
        &self.sequences
    }

    /// Add a sequence only if no sequence with that name exists
    /// (idempotent convention form). Fails on frozen models.
    pub fn ensure_sequence(&mut self, sequence: SequenceDescriptor) -> Result<()> {
        self.guard_mutation()?;
        if !self.sequences.iter().any(|s| s.name == sequence.name) {
            self.sequences.push(sequence);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Predicate;

    fn entity_with_props() -> EntityDescriptor {
        let mut e = EntityDescriptor::new("release", "releases");
        e.add_property(PropertyDescriptor::new("id", PropertyType::BigInt).key(true))
            .unwrap();
        e.add_property(PropertyDescriptor::new("is_primary", PropertyType::Bool))
            .unwrap();
        e
    }

    #[test]
    fn test_duplicate_property_is_configuration_error() {
        let mut e = entity_with_props();
        let err = e
            .add_property(PropertyDescriptor::new("id", PropertyType::BigInt))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ensure_property_is_idempotent() {
        let mut e = entity_with_props();
        e.ensure_property(PropertyDescriptor::new("is_primary", PropertyType::Bool));
        e.ensure_property(PropertyDescriptor::new("episode_count", PropertyType::Int));
        e.ensure_property(PropertyDescriptor::new("episode_count", PropertyType::Int));
        assert_eq!(e.properties().len(), 4);
    }

    #[test]
    fn test_is_key_or_indexed() {
        let mut e = entity_with_props();
        e.ensure_index(IndexDescriptor::new(
            "ux_releases_is_primary",
            vec!["is_primary".to_string()],
            false,
        ));
        assert!(e.is_key_or_indexed("id"));
        assert!(e.is_key_or_indexed("is_primary"));
        assert!(!e.is_key_or_indexed("episode_count"));
    }

    #[test]
    fn test_ensure_index_dedups_by_name() {
        let mut e = entity_with_props();
        let ix = IndexDescriptor::new("ux_one", vec!["id".to_string()], true);
        e.ensure_index(ix.clone());
        e.ensure_index(ix);
        assert_eq!(e.indexes().len(), 1);
    }

    #[test]
    fn test_convention_filter_never_overwrites_explicit() {
        let mut e = entity_with_props();
        e.set_explicit_filter(Predicate::not_property(["is_primary"]));
        assert!(!e.set_convention_filter(Predicate::not_property(["is_soft_deleted"])));
        let (_, source) = e.query_filter().unwrap();
        assert_eq!(source, FilterSource::Explicit);
    }

    #[test]
    fn test_convention_filter_replaces_convention_filter() {
        let mut e = entity_with_props();
        assert!(e.set_convention_filter(Predicate::not_property(["is_soft_deleted"])));
        assert!(e.set_convention_filter(Predicate::not_property(["is_soft_deleted"])));
        let (_, source) = e.query_filter().unwrap();
        assert_eq!(source, FilterSource::Convention);
    }

    #[test]
    fn test_frozen_model_rejects_mutation() {
        let mut model = SchemaModel::new();
        model.add_entity(entity_with_props()).unwrap();
        model.freeze();

        assert!(model.entity_mut("release").is_err());
        assert!(model.add_entity(EntityDescriptor::new("x", "xs")).is_err());
        assert!(
            model
                .ensure_sequence(SequenceDescriptor::new("seq_x"))
                .is_err()
        );
        // Reads still work.
        assert!(model.entity("release").is_some());
    }

    #[test]
    fn test_duplicate_entity_is_configuration_error() {
        let mut model = SchemaModel::new();
        model.add_entity(entity_with_props()).unwrap();
        let err = model.add_entity(entity_with_props()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ensure_sequence_is_idempotent() {
        let mut model = SchemaModel::new();
        model
            .ensure_sequence(SequenceDescriptor::new("seq_releases_public_id"))
            .unwrap();
        model
            .ensure_sequence(SequenceDescriptor::new("seq_releases_public_id"))
            .unwrap();
        assert_eq!(model.sequences().len(), 1);
    }
}
