//! The save pipeline: before-save triggers, one primary commit,
//! after-save effects.
//!
//! The two trigger phases are deliberately asymmetric. Before-save
//! triggers can veto: any error aborts the whole batch and nothing
//! commits. After-save triggers run once the primary commit has already
//! succeeded; their failures are logged and collected into the returned
//! [`SaveReport`], never rolled back into a save failure. Callers that
//! care about secondary effects must inspect the report.

use std::sync::Arc;

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::{Error, SchemaModel};

use crate::change::{ChangeRecord, SaveBatch};
use crate::registry::TriggerRegistry;
use crate::store::{Store, StoreSession};

/// Mutable view a before-save trigger gets of the save in progress.
pub struct TriggerContext<'a, S: Store> {
    records: &'a [ChangeRecord],
    store: &'a S,
    staged: Vec<ChangeRecord>,
}

impl<'a, S: Store> TriggerContext<'a, S> {
    fn new(records: &'a [ChangeRecord], store: &'a S) -> Self {
        Self {
            records,
            store,
            staged: Vec::new(),
        }
    }

    /// The batch's original records.
    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        self.records
    }

    /// Records staged by triggers so far.
    #[must_use]
    pub fn staged(&self) -> &[ChangeRecord] {
        &self.staged
    }

    /// Everything headed for the primary commit.
    pub fn in_flight(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().chain(self.staged.iter())
    }

    /// Stage an additional record into the same primary commit. Staged
    /// records do not re-enter the before-save phase.
    pub fn stage(&mut self, mut record: ChangeRecord) {
        record.normalize();
        self.staged.push(record);
    }

    /// The store, for nested reads.
    #[must_use]
    pub fn store(&self) -> &'a S {
        self.store
    }

    /// True if a delete for `(entity, id)` is already in flight.
    #[must_use]
    pub fn contains_deleted(&self, entity: &str, id: &mediamodel_core::Value) -> bool {
        self.in_flight().any(|r| {
            r.entity() == entity
                && r.kind() == crate::change::ChangeKind::Deleted
                && r.values().get("id") == Some(id)
        })
    }

    fn into_staged(self) -> Vec<ChangeRecord> {
        self.staged
    }
}

/// A save-pipeline hook.
///
/// Both phases default to no-ops so a trigger implements only the side it
/// needs. Implementations must be stateless across saves.
#[async_trait]
pub trait SaveTrigger<S: Store>: Send + Sync {
    /// Stable name, used in tracing and failure reports.
    fn name(&self) -> &'static str;

    /// Runs before the primary commit. An error aborts the entire batch.
    async fn before_save(
        &self,
        _cx: &Cx,
        _record: &ChangeRecord,
        _ctx: &mut TriggerContext<'_, S>,
    ) -> Outcome<(), Error> {
        Outcome::Ok(())
    }

    /// Runs after the primary commit, with its own sessions and commits.
    /// An error becomes a [`SecondaryFailure`], not a save failure.
    async fn after_save(&self, _cx: &Cx, _record: &ChangeRecord, _store: &S) -> Outcome<(), Error> {
        Outcome::Ok(())
    }
}

/// One after-save trigger failure, attached to an otherwise successful
/// save.
#[derive(Debug)]
pub struct SecondaryFailure {
    /// Trigger that failed.
    pub trigger: &'static str,
    /// Entity of the record it was processing.
    pub entity: String,
    /// The error.
    pub error: Error,
}

/// Outcome of one saved batch.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Rows written by the primary commit.
    pub committed: u64,
    /// After-save trigger failures. The primary commit stands regardless.
    pub secondary_failures: Vec<SecondaryFailure>,
    /// Cancellation arrived during the after-save phase; remaining
    /// secondary effects were skipped.
    pub after_save_interrupted: bool,
}

impl SaveReport {
    /// True when every secondary effect completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.secondary_failures.is_empty() && !self.after_save_interrupted
    }
}

/// Drives batches through the trigger phases and the primary commit.
pub struct SaveExecutor<S: Store> {
    store: S,
    model: Arc<SchemaModel>,
    registry: TriggerRegistry<S>,
}

impl<S: Store> SaveExecutor<S> {
    /// Build an executor over a frozen model.
    pub fn new(store: S, model: Arc<SchemaModel>, registry: TriggerRegistry<S>) -> Self {
        Self {
            store,
            model,
            registry,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registered `(key, trigger name)` pairs, for diagnostics.
    #[must_use]
    pub fn debug_state(&self) -> Vec<(crate::registry::TriggerKey, &'static str)> {
        self.registry.debug_state()
    }

    /// Save one batch.
    ///
    /// `Err` means nothing committed. `Ok` means the primary commit
    /// succeeded; check the report for secondary failures.
    #[tracing::instrument(skip_all, fields(records = batch.len()))]
    pub async fn save(&self, cx: &Cx, batch: SaveBatch) -> Outcome<SaveReport, Error> {
        let records = batch.into_records();

        // Phase 1: before-save triggers, any failure aborts the batch.
        let mut ctx = TriggerContext::new(&records, &self.store);
        for record in &records {
            for trigger in self.registry.matching(record.entity(), &self.model) {
                match trigger.before_save(cx, record, &mut ctx).await {
                    Outcome::Ok(()) => {}
                    Outcome::Err(e) => {
                        tracing::warn!(
                            trigger = trigger.name(),
                            entity = record.entity(),
                            error = %e,
                            "before-save trigger aborted the batch"
                        );
                        return Outcome::Err(e);
                    }
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
            }
        }
        let staged = ctx.into_staged();

        // Phase 2: the primary commit, original plus trigger-staged records.
        let mut session = match self.store.open(cx).await {
            Outcome::Ok(session) => session,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        for record in records.iter().chain(staged.iter()) {
            tracing::debug!(record = %record.snapshot_json(), "staging for primary commit");
            session.stage(record.clone());
        }
        let committed = match session.commit(cx).await {
            Outcome::Ok(count) => count,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        // Phase 3: after-save effects. The primary commit stands whatever
        // happens here.
        let mut report = SaveReport {
            committed,
            ..SaveReport::default()
        };
        for record in records.iter().chain(staged.iter()) {
            for trigger in self.registry.matching(record.entity(), &self.model) {
                match trigger.after_save(cx, record, &self.store).await {
                    Outcome::Ok(()) => {}
                    Outcome::Err(error) => {
                        tracing::error!(
                            trigger = trigger.name(),
                            entity = record.entity(),
                            error = %error,
                            "after-save trigger failed; primary commit stands"
                        );
                        report.secondary_failures.push(SecondaryFailure {
                            trigger: trigger.name(),
                            entity: record.entity().to_string(),
                            error,
                        });
                    }
                    Outcome::Cancelled(_) => {
                        report.after_save_interrupted = true;
                        return Outcome::Ok(report);
                    }
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
            }
        }
        Outcome::Ok(report)
    }
}
