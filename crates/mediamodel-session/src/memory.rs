//! In-memory store: the reference [`Store`] implementation.
//!
//! Used by tests and embedded callers that need trigger semantics without
//! a real database. Rows are identified by their `id` column. A commit
//! failure can be injected to exercise secondary-effect error paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use asupersync::{Cx, Outcome};

use mediamodel_core::{Error, Value};

use crate::change::{ChangeKind, ChangeRecord, EntityValues};
use crate::store::{Store, StoreSession};

#[derive(Debug, Default)]
struct MemoryInner {
    tables: HashMap<String, Vec<EntityValues>>,
    fail_at: Option<(u64, String)>,
    attempts: u64,
    commits: u64,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the session path.
    pub fn insert_row(&self, entity: impl Into<String>, values: EntityValues) {
        let mut inner = self.inner.lock().unwrap();
        inner.tables.entry(entity.into()).or_default().push(values);
    }

    /// Snapshot of an entity's rows.
    #[must_use]
    pub fn rows(&self, entity: &str) -> Vec<EntityValues> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(entity).cloned().unwrap_or_default()
    }

    /// Make the next commit attempt fail with a store error.
    pub fn fail_next_commit(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        let next = inner.attempts + 1;
        inner.fail_at = Some((next, message.into()));
    }

    /// Make the `attempt`-th commit attempt (1-based, counted from store
    /// creation) fail. Lets tests target a nested commit specifically.
    pub fn fail_commit_attempt(&self, attempt: u64, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_at = Some((attempt, message.into()));
    }

    /// Number of successful commits so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner.commits
    }
}

impl Store for MemoryStore {
    type Session = MemorySession;

    fn open(&self, _cx: &Cx) -> impl Future<Output = Outcome<Self::Session, Error>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            Outcome::Ok(MemorySession {
                inner,
                staged: Vec::new(),
            })
        }
    }
}

/// One unit of work against a [`MemoryStore`].
#[derive(Debug)]
pub struct MemorySession {
    inner: Arc<Mutex<MemoryInner>>,
    staged: Vec<ChangeRecord>,
}

fn row_matches(row: &EntityValues, filter: &[(&str, Value)]) -> bool {
    filter
        .iter()
        .all(|(column, value)| row.get(column) == Some(value))
}

fn same_id(row: &EntityValues, values: &EntityValues) -> bool {
    match (row.get("id"), values.get("id")) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl StoreSession for MemorySession {
    fn fetch(
        &mut self,
        _cx: &Cx,
        entity: &str,
        filter: &[(&str, Value)],
    ) -> impl Future<Output = Outcome<Vec<EntityValues>, Error>> + Send {
        let inner = Arc::clone(&self.inner);
        let entity = entity.to_string();
        let filter: Vec<(String, Value)> = filter
            .iter()
            .map(|(c, v)| ((*c).to_string(), v.clone()))
            .collect();
        async move {
            let inner = inner.lock().unwrap();
            let borrowed: Vec<(&str, Value)> = filter
                .iter()
                .map(|(c, v)| (c.as_str(), v.clone()))
                .collect();
            let rows = inner
                .tables
                .get(&entity)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| row_matches(row, &borrowed))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Outcome::Ok(rows)
        }
    }

    fn stage(&mut self, record: ChangeRecord) {
        self.staged.push(record);
    }

    fn commit(self, _cx: &Cx) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let inner = Arc::clone(&self.inner);
        let staged = self.staged;
        async move {
            let mut inner = inner.lock().unwrap();
            inner.attempts += 1;
            if let Some((at, message)) = inner.fail_at.take() {
                if at == inner.attempts {
                    return Outcome::Err(Error::store(message));
                }
                inner.fail_at = Some((at, message));
            }

            let mut applied = 0u64;
            for record in staged {
                let table = inner.tables.entry(record.entity().to_string()).or_default();
                match record.kind() {
                    ChangeKind::Added => {
                        table.push(record.values().clone());
                        applied += 1;
                    }
                    ChangeKind::Modified => {
                        for row in table.iter_mut().filter(|r| same_id(r, record.values())) {
                            row.merge(record.values());
                            applied += 1;
                        }
                    }
                    ChangeKind::Deleted | ChangeKind::Detached => {
                        let before = table.len();
                        table.retain(|r| !same_id(r, record.values()));
                        applied += (before - table.len()) as u64;
                    }
                }
            }
            inner.commits += 1;
            Outcome::Ok(applied)
        }
    }
}
