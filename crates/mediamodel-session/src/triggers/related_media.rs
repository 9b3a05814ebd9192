//! Related-media cleanup on media deletion.

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::Error;

use crate::change::{ChangeKind, ChangeRecord, EntityValues};
use crate::save::{SaveTrigger, TriggerContext};
use crate::store::{Store, StoreSession};

use super::{ID, RELATED_MEDIA, SOURCE_ID, TARGET_ID};

/// Deletes `related_media` links when either side of the pair is deleted.
///
/// The link table references media rows on both sides of a
/// self-referencing map, which rules out a database-level cascade
/// (multiple cascade paths). This trigger loads every link touching the
/// deleted row and stages key-only delete stubs into the same primary
/// commit, so the links vanish atomically with the media row.
#[derive(Debug, Default)]
pub struct RelatedMediaCascadeTrigger;

#[async_trait]
impl<S: Store> SaveTrigger<S> for RelatedMediaCascadeTrigger {
    fn name(&self) -> &'static str {
        "related_media_cascade"
    }

    async fn before_save(
        &self,
        cx: &Cx,
        record: &ChangeRecord,
        ctx: &mut TriggerContext<'_, S>,
    ) -> Outcome<(), Error> {
        if record.kind() != ChangeKind::Deleted {
            return Outcome::Ok(());
        }
        let Some(media_id) = record.values().get(ID).cloned() else {
            return Outcome::Err(Error::invalid_operation(format!(
                "{} delete record carries no id",
                record.entity()
            )));
        };

        let mut session = match ctx.store().open(cx).await {
            Outcome::Ok(session) => session,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let mut links = Vec::new();
        for side in [SOURCE_ID, TARGET_ID] {
            let rows = match session
                .fetch(cx, RELATED_MEDIA, &[(side, media_id.clone())])
                .await
            {
                Outcome::Ok(rows) => rows,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            links.extend(rows);
        }

        let mut staged = 0usize;
        for link in links {
            let Some(link_id) = link.get(ID).cloned() else {
                continue;
            };
            if ctx.contains_deleted(RELATED_MEDIA, &link_id) {
                continue;
            }
            ctx.stage(ChangeRecord::deleted(
                RELATED_MEDIA,
                EntityValues::new().with(ID, link_id),
            ));
            staged += 1;
        }
        tracing::debug!(
            entity = record.entity(),
            links = staged,
            "staged related-media deletes"
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
        for (name, table) in [("anime", "animes"), (RELATED_MEDIA, "related_media")] {
            model
                .add_entity(mediamodel_core::EntityDescriptor::new(name, table))
                .unwrap();
        }
        model.freeze();
        let mut registry = TriggerRegistry::new();
        registry.for_entity("anime", Arc::new(RelatedMediaCascadeTrigger));
        SaveExecutor::new(store, Arc::new(model), registry)
    }

    fn link(id: i64, source: i64, target: i64) -> EntityValues {
        EntityValues::new()
            .with(ID, id)
            .with(SOURCE_ID, source)
            .with(TARGET_ID, target)
    }

    #[test]
    fn test_links_on_both_sides_are_deleted() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row("anime", EntityValues::new().with(ID, 1));
            store.insert_row(RELATED_MEDIA, link(100, 1, 2));
            store.insert_row(RELATED_MEDIA, link(101, 3, 1));
            store.insert_row(RELATED_MEDIA, link(102, 2, 3));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::deleted(
                "anime",
                EntityValues::new().with(ID, 1),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();

            let remaining = store.rows(RELATED_MEDIA);
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].get_int(ID), Some(102));
            assert!(store.rows("anime").is_empty());
        });
    }

    #[test]
    fn test_non_delete_records_are_ignored() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELATED_MEDIA, link(100, 1, 2));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::added(
                "anime",
                EntityValues::new().with(ID, 1),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            assert_eq!(store.rows(RELATED_MEDIA).len(), 1);
        });
    }
}
