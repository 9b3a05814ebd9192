//! List-entry progress clamping when a release shrinks.

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::Error;

use crate::change::{ChangeKind, ChangeRecord, EntityValues};
use crate::save::{SaveTrigger, TriggerContext};
use crate::store::{Store, StoreSession};

use super::{
    EPISODE_COUNT, ID, IS_PRIMARY, LIST_ENTRY, MEDIA_ID, PROGRESS, STATUS, STATUS_COMPLETE,
    STATUS_PAUSED,
};

/// When the primary release's episode count shrinks, clamps every list
/// entry whose progress now exceeds it.
///
/// Clamped entries are staged into the same primary commit. An entry that
/// was `complete` can no longer be complete against the shorter release,
/// so it is demoted to `paused`. Entries at or below the new count are
/// untouched.
#[derive(Debug, Default)]
pub struct ProgressClampTrigger;

#[async_trait]
impl<S: Store> SaveTrigger<S> for ProgressClampTrigger {
    fn name(&self) -> &'static str {
        "progress_clamp"
    }

    async fn before_save(
        &self,
        cx: &Cx,
        record: &ChangeRecord,
        ctx: &mut TriggerContext<'_, S>,
    ) -> Outcome<(), Error> {
        if record.kind() != ChangeKind::Modified
            || record.values().get_bool(IS_PRIMARY) != Some(true)
        {
            return Outcome::Ok(());
        }
        let new_count = record.values().get_int(EPISODE_COUNT);
        let old_count = record.prior().and_then(|p| p.get_int(EPISODE_COUNT));
        let (Some(new_count), Some(old_count)) = (new_count, old_count) else {
            return Outcome::Ok(());
        };
        if new_count >= old_count {
            return Outcome::Ok(());
        }

        let owner = record
            .values()
            .get(MEDIA_ID)
            .or_else(|| record.prior().and_then(|p| p.get(MEDIA_ID)))
            .cloned();
        let Some(owner) = owner else {
            return Outcome::Err(Error::invalid_operation(
                "primary release update carries no media_id",
            ));
        };

        let mut session = match ctx.store().open(cx).await {
            Outcome::Ok(session) => session,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        let entries = match session
            .fetch(cx, LIST_ENTRY, &[(MEDIA_ID, owner.clone())])
            .await
        {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let mut clamped = 0usize;
        for entry in entries {
            let Some(progress) = entry.get_int(PROGRESS) else {
                continue;
            };
            if progress <= new_count {
                continue;
            }
            let Some(entry_id) = entry.get(ID).cloned() else {
                continue;
            };
            let already_staged = ctx
                .staged()
                .iter()
                .any(|r| r.entity() == LIST_ENTRY && r.values().get(ID) == Some(&entry_id));
            if already_staged {
                continue;
            }

            let mut update = EntityValues::new()
                .with(ID, entry_id)
                .with(PROGRESS, new_count);
            if entry.get_str(STATUS) == Some(STATUS_COMPLETE) {
                update.set(STATUS, STATUS_PAUSED);
            }
            ctx.stage(ChangeRecord::modified(LIST_ENTRY, update, entry));
            clamped += 1;
        }
        tracing::debug!(
            media = ?owner,
            new_count,
            clamped,
            "clamped list-entry progress to shrunken release"
        );
        Outcome::Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::SaveBatch;
    use crate::memory::MemoryStore;
    use crate::registry::TriggerRegistry;
    use crate::save::SaveExecutor;
    use crate::triggers::RELEASE;
    use mediamodel_core::SchemaModel;
    use std::sync::Arc;

    fn block_on<T>(f: impl Future<Output = T>) -> T {
        let rt = asupersync::runtime::RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        rt.block_on(f)
    }

    fn unwrap_outcome<T>(outcome: Outcome<T, Error>) -> std::result::Result<T, String> {
        match outcome {
            Outcome::Ok(v) => Ok(v),
            Outcome::Err(e) => Err(format!("error: {e}")),
            Outcome::Cancelled(_) => Err("cancelled".to_string()),
            Outcome::Panicked(_) => Err("panicked".to_string()),
        }
    }

    fn executor(store: MemoryStore) -> SaveExecutor<MemoryStore> {
        let mut model = SchemaModel::new();
        for (name, table) in [(RELEASE, "releases"), (LIST_ENTRY, "list_entries")] {
            model
                .add_entity(mediamodel_core::EntityDescriptor::new(name, table))
                .unwrap();
        }
        model.freeze();
        let mut registry = TriggerRegistry::new();
        registry.for_entity(RELEASE, Arc::new(ProgressClampTrigger));
        SaveExecutor::new(store, Arc::new(model), registry)
    }

    fn release(count: i64) -> EntityValues {
        EntityValues::new()
            .with(ID, 1)
            .with(MEDIA_ID, 10)
            .with(IS_PRIMARY, true)
            .with(EPISODE_COUNT, count)
    }

    fn entry(id: i64, progress: i64, status: &str) -> EntityValues {
        EntityValues::new()
            .with(ID, id)
            .with(MEDIA_ID, 10)
            .with(PROGRESS, progress)
            .with(STATUS, status)
    }

    #[test]
    fn test_shrinking_count_clamps_and_demotes() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(24));
            store.insert_row(LIST_ENTRY, entry(1, 24, STATUS_COMPLETE));
            store.insert_row(LIST_ENTRY, entry(2, 15, "watching"));
            store.insert_row(LIST_ENTRY, entry(3, 8, "watching"));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(RELEASE, release(12), release(24)));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();

            let entries = store.rows(LIST_ENTRY);
            let by_id = |id: i64| {
                entries
                    .iter()
                    .find(|e| e.get_int(ID) == Some(id))
                    .cloned()
                    .unwrap()
            };
            // Completed entry past the new count: clamped and demoted.
            assert_eq!(by_id(1).get_int(PROGRESS), Some(12));
            assert_eq!(by_id(1).get_str(STATUS), Some(STATUS_PAUSED));
            // Watching entry past the new count: clamped, status kept.
            assert_eq!(by_id(2).get_int(PROGRESS), Some(12));
            assert_eq!(by_id(2).get_str(STATUS), Some("watching"));
            // Entry at or below the new count: untouched.
            assert_eq!(by_id(3).get_int(PROGRESS), Some(8));
        });
    }

    #[test]
    fn test_growing_count_changes_nothing() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(12));
            store.insert_row(LIST_ENTRY, entry(1, 12, STATUS_COMPLETE));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(RELEASE, release(24), release(12)));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            let entries = store.rows(LIST_ENTRY);
            assert_eq!(entries[0].get_int(PROGRESS), Some(12));
            assert_eq!(entries[0].get_str(STATUS), Some(STATUS_COMPLETE));
        });
    }

    #[test]
    fn test_non_primary_release_is_ignored() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            let secondary = EntityValues::new()
                .with(ID, 2)
                .with(MEDIA_ID, 10)
                .with(IS_PRIMARY, false)
                .with(EPISODE_COUNT, 24);
            store.insert_row(RELEASE, secondary.clone());
            store.insert_row(LIST_ENTRY, entry(1, 20, "watching"));
            let executor = executor(store.clone());

            let mut shrunk = secondary.clone();
            shrunk.set(EPISODE_COUNT, 5);
            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(RELEASE, shrunk, secondary));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            assert_eq!(store.rows(LIST_ENTRY)[0].get_int(PROGRESS), Some(20));
        });
    }
}
