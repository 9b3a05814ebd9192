//! The recursive validation builder.

use std::collections::HashSet;

use crate::result::{PropertyPath, ValidationResult};

/// Message attached to a null non-nullable property.
pub const NULL_VALUE_MESSAGE: &str = "value may not be null";

/// Message attached to a null element of a non-nullable-element collection.
pub const NULL_ELEMENT_MESSAGE: &str = "one or more elements is null";

type EntityRule<'e, T> = Box<dyn FnOnce(&'e T, &mut ValidationBuilder<'e, T>) + 'e>;

/// Collects validation results over one entity instance.
///
/// Property rules evaluate eagerly as they are declared; entity-level
/// rules added through [`add_validation_rule`](Self::add_validation_rule)
/// are deferred until [`validate`](Self::validate). The final list is
/// ordered: property results first, then entity-rule results, then direct
/// results.
///
/// Null handling is uniform: a missing non-nullable value produces exactly
/// one "value may not be null" result for its path per pass, and every
/// rule attached to it is skipped. Other properties are unaffected.
pub struct ValidationBuilder<'e, T> {
    entity: &'e T,
    prefix: PropertyPath,
    property_results: Vec<ValidationResult>,
    missing: HashSet<String>,
    entity_rules: Vec<EntityRule<'e, T>>,
    direct_results: Vec<ValidationResult>,
}

impl<'e, T> ValidationBuilder<'e, T> {
    /// Start validating an entity at the root path.
    #[must_use]
    pub fn new(entity: &'e T) -> Self {
        Self::with_prefix(entity, PropertyPath::root())
    }

    fn with_prefix(entity: &'e T, prefix: PropertyPath) -> Self {
        Self {
            entity,
            prefix,
            property_results: Vec::new(),
            missing: HashSet::new(),
            entity_rules: Vec::new(),
            direct_results: Vec::new(),
        }
    }

    /// The entity under validation.
    #[must_use]
    pub fn entity(&self) -> &'e T {
        self.entity
    }

    /// Declare a non-nullable property. A `None` value produces the single
    /// missing-value result and skips every attached rule.
    pub fn property<P>(&mut self, name: &str, value: Option<&'e P>) -> PropertyRules<'_, 'e, T, P> {
        let path = self.prefix.clone().child(name);
        let skip_all = value.is_none();
        if skip_all {
            self.record_missing(path.clone());
        }
        PropertyRules {
            builder: self,
            path,
            value,
            skip_all,
        }
    }

    /// Declare a nullable property. A `None` value is fine; null-checked
    /// rules are skipped, `rule_even_if_missing` rules still run.
    pub fn optional_property<P>(
        &mut self,
        name: &str,
        value: Option<&'e P>,
    ) -> PropertyRules<'_, 'e, T, P> {
        let path = self.prefix.clone().child(name);
        PropertyRules {
            builder: self,
            path,
            value,
            skip_all: false,
        }
    }

    /// Recurse into a required owned child with a path-prefixed builder.
    pub fn validate_owned_entity<C>(
        &mut self,
        name: &str,
        child: Option<&'e C>,
        f: impl FnOnce(&mut ValidationBuilder<'e, C>),
    ) {
        let path = self.prefix.clone().child(name);
        match child {
            None => self.record_missing(path),
            Some(child) => self.run_nested(path, child, f),
        }
    }

    /// Recurse into an optional owned child; absence is not a failure.
    pub fn optional_owned_entity<C>(
        &mut self,
        name: &str,
        child: Option<&'e C>,
        f: impl FnOnce(&mut ValidationBuilder<'e, C>),
    ) {
        if let Some(child) = child {
            let path = self.prefix.clone().child(name);
            self.run_nested(path, child, f);
        }
    }

    /// Recurse into every element of a required owned collection. A `None`
    /// collection produces only the missing-value result; elements get
    /// index-qualified paths.
    pub fn validate_owned_entities<C>(
        &mut self,
        name: &str,
        children: Option<&'e [C]>,
        f: impl Fn(&mut ValidationBuilder<'e, C>),
    ) {
        let Some(children) = children else {
            let path = self.prefix.clone().child(name);
            self.record_missing(path);
            return;
        };
        for (index, child) in children.iter().enumerate() {
            let path = self.prefix.clone().child_indexed(name, index);
            self.run_nested(path, child, &f);
        }
    }

    /// Collection traversal where the element type itself is non-nullable
    /// but the storage admits null slots. Each null slot produces one
    /// null-element result; the remaining elements are still validated.
    pub fn validate_owned_entities_nullable<C>(
        &mut self,
        name: &str,
        children: Option<&'e [Option<C>]>,
        f: impl Fn(&mut ValidationBuilder<'e, C>),
    ) {
        let Some(children) = children else {
            let path = self.prefix.clone().child(name);
            self.record_missing(path);
            return;
        };
        for (index, slot) in children.iter().enumerate() {
            let path = self.prefix.clone().child_indexed(name, index);
            match slot {
                None => self
                    .property_results
                    .push(ValidationResult::new(NULL_ELEMENT_MESSAGE, path)),
                Some(child) => self.run_nested(path, child, &f),
            }
        }
    }

    /// Add an entity-level rule, deferred until [`validate`](Self::validate).
    /// The rule receives the raw entity and a fresh builder sharing this
    /// builder's path prefix.
    pub fn add_validation_rule(
        &mut self,
        f: impl FnOnce(&'e T, &mut ValidationBuilder<'e, T>) + 'e,
    ) {
        self.entity_rules.push(Box::new(f));
    }

    /// Add an already-built result, path-relative to this builder.
    pub fn add_validation_result(&mut self, message: impl Into<String>, path: PropertyPath) {
        let full = self.prefix.clone().join(path);
        self.direct_results.push(ValidationResult::new(message, full));
    }

    /// Run deferred rules and return the flat result list.
    #[must_use]
    pub fn validate(self) -> Vec<ValidationResult> {
        let Self {
            entity,
            prefix,
            property_results,
            entity_rules,
            direct_results,
            ..
        } = self;

        let mut results = property_results;
        for rule in entity_rules {
            let mut nested = ValidationBuilder::with_prefix(entity, prefix.clone());
            rule(entity, &mut nested);
            results.extend(nested.validate());
        }
        results.extend(direct_results);
        results
    }

    fn record_missing(&mut self, path: PropertyPath) {
        if self.missing.insert(path.to_string()) {
            self.property_results
                .push(ValidationResult::new(NULL_VALUE_MESSAGE, path));
        }
    }

    fn run_nested<C>(
        &mut self,
        path: PropertyPath,
        child: &'e C,
        f: impl FnOnce(&mut ValidationBuilder<'e, C>),
    ) {
        let mut nested = ValidationBuilder::with_prefix(child, path);
        f(&mut nested);
        self.property_results.extend(nested.validate());
    }
}

/// Chainable rule declarations for one property.
pub struct PropertyRules<'b, 'e, T, P> {
    builder: &'b mut ValidationBuilder<'e, T>,
    path: PropertyPath,
    value: Option<&'e P>,
    skip_all: bool,
}

impl<'b, 'e, T, P> PropertyRules<'b, 'e, T, P> {
    /// Check a predicate against the value. Skipped when the value is
    /// absent.
    pub fn rule(self, predicate: impl FnOnce(&P) -> bool, message: impl Into<String>) -> Self {
        if !self.skip_all {
            if let Some(value) = self.value {
                if !predicate(value) {
                    self.builder
                        .property_results
                        .push(ValidationResult::new(message, self.path.clone()));
                }
            }
        }
        self
    }

    /// Check a predicate that also sees absence. Runs for nullable
    /// properties whether or not the value is present.
    pub fn rule_even_if_missing(
        self,
        predicate: impl FnOnce(Option<&P>) -> bool,
        message: impl Into<String>,
    ) -> Self {
        if !self.skip_all && !predicate(self.value) {
            self.builder
                .property_results
                .push(ValidationResult::new(message, self.path.clone()));
        }
        self
    }
}
