//! Change records: what one save is about to persist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mediamodel_core::{EntityView, Value};

/// The kind of change a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// New row.
    Added,
    /// Existing row with changed columns.
    Modified,
    /// Row to remove.
    Deleted,
    /// No longer tracked. Normalized to [`Deleted`](ChangeKind::Deleted) at
    /// batch intake; triggers never observe it.
    Detached,
}

impl ChangeKind {
    /// Collapse `Detached` into `Deleted`.
    #[must_use]
    pub fn normalize(self) -> Self {
        match self {
            ChangeKind::Detached => ChangeKind::Deleted,
            other => other,
        }
    }
}

/// An ordered column-to-value map: the row image a change carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityValues {
    columns: BTreeMap<String, Value>,
}

impl EntityValues {
    /// Empty row image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, chainable for literal construction.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Raw column lookup.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Column lookup as a boolean.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(Value::as_bool)
    }

    /// Column lookup as an integer.
    #[must_use]
    pub fn get_int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_int)
    }

    /// Column lookup as a string.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// True if the column is present.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Iterate columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay another image on top of this one (used when applying a
    /// column-subset update to a stored row).
    pub fn merge(&mut self, other: &EntityValues) {
        for (column, value) in other.iter() {
            self.columns.insert(column.to_string(), value.clone());
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no columns are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl EntityView for EntityValues {
    fn bool_value(&self, path: &[String]) -> Option<bool> {
        // Navigation paths are flattened to dotted columns in row images.
        let key = path.join(".");
        self.get_bool(&key)
    }
}

impl FromIterator<(String, Value)> for EntityValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// One entity-level change inside a save. Lives only for the duration of
/// that save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    entity: String,
    kind: ChangeKind,
    values: EntityValues,
    prior: Option<EntityValues>,
}

impl ChangeRecord {
    /// An insert carrying the full new row image.
    pub fn added(entity: impl Into<String>, values: EntityValues) -> Self {
        Self {
            entity: entity.into(),
            kind: ChangeKind::Added,
            values,
            prior: None,
        }
    }

    /// An update carrying the new image and the stored image it replaces.
    pub fn modified(entity: impl Into<String>, values: EntityValues, prior: EntityValues) -> Self {
        Self {
            entity: entity.into(),
            kind: ChangeKind::Modified,
            values,
            prior: Some(prior),
        }
    }

    /// A delete; `values` needs only the key columns.
    pub fn deleted(entity: impl Into<String>, values: EntityValues) -> Self {
        Self {
            entity: entity.into(),
            kind: ChangeKind::Deleted,
            values,
            prior: None,
        }
    }

    /// A detached record, normalized to a delete at batch intake.
    pub fn detached(entity: impl Into<String>, values: EntityValues) -> Self {
        Self {
            entity: entity.into(),
            kind: ChangeKind::Detached,
            values,
            prior: None,
        }
    }

    /// Entity name.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Change kind.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Current row image.
    #[must_use]
    pub fn values(&self) -> &EntityValues {
        &self.values
    }

    /// Stored image being replaced (updates only).
    #[must_use]
    pub fn prior(&self) -> Option<&EntityValues> {
        self.prior.as_ref()
    }

    pub(crate) fn normalize(&mut self) {
        self.kind = self.kind.normalize();
    }

    /// JSON snapshot for structured logging.
    #[must_use]
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// The pending-save handle: the records one save will persist.
#[derive(Debug, Clone, Default)]
pub struct SaveBatch {
    records: Vec<ChangeRecord>,
}

impl SaveBatch {
    /// Empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Detached records are normalized to deletes here, so
    /// nothing downstream ever sees `Detached`.
    pub fn push(&mut self, mut record: ChangeRecord) {
        record.normalize();
        self.records.push(record);
    }

    /// Attach a key-only stub marked deleted.
    pub fn attach_deleted(&mut self, entity: impl Into<String>, keys: EntityValues) {
        self.records.push(ChangeRecord::deleted(entity, keys));
    }

    /// The records, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}
