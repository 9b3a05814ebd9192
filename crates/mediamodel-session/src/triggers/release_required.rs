//! New media must arrive with at least one release.

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::Error;

use crate::change::{ChangeKind, ChangeRecord};
use crate::save::{SaveTrigger, TriggerContext};
use crate::store::Store;

use super::{ID, MEDIA_ID, RELEASE};

/// Rejects a batch inserting a media row without a release for it.
///
/// A media row with zero releases is representable in the schema but
/// meaningless in the catalog; creating one is a caller bug surfaced at
/// save time rather than a later orphan.
#[derive(Debug, Default)]
pub struct ReleaseRequiredTrigger;

#[async_trait]
impl<S: Store> SaveTrigger<S> for ReleaseRequiredTrigger {
    fn name(&self) -> &'static str {
        "release_required"
    }

    async fn before_save(
        &self,
        _cx: &Cx,
        record: &ChangeRecord,
        ctx: &mut TriggerContext<'_, S>,
    ) -> Outcome<(), Error> {
        if record.kind() != ChangeKind::Added {
            return Outcome::Ok(());
        }
        let Some(media_id) = record.values().get(ID) else {
            return Outcome::Err(Error::invalid_operation(format!(
                "new {} record carries no id",
                record.entity()
            )));
        };

        let has_release = ctx.records().iter().any(|r| {
            r.entity() == RELEASE
                && r.kind() == ChangeKind::Added
                && r.values().get(MEDIA_ID) == Some(media_id)
        });
        if has_release {
            Outcome::Ok(())
        } else {
            Outcome::Err(Error::invalid_operation(format!(
                "a new {} must be saved together with at least one release",
                record.entity()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{EntityValues, SaveBatch};
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
        for (name, table) in [("manga", "mangas"), (RELEASE, "releases")] {
            model
                .add_entity(mediamodel_core::EntityDescriptor::new(name, table))
                .unwrap();
        }
        model.freeze();
        let mut registry = TriggerRegistry::new();
        registry.for_entity("manga", Arc::new(ReleaseRequiredTrigger));
        SaveExecutor::new(store, Arc::new(model), registry)
    }

    #[test]
    fn test_insert_without_release_is_rejected() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::added(
                "manga",
                EntityValues::new().with(ID, 1),
            ));

            let err = unwrap_outcome(executor.save(&cx, batch).await).unwrap_err();
            assert!(err.contains("at least one release"));
            assert!(store.rows("manga").is_empty());
        });
    }

    #[test]
    fn test_insert_with_release_in_batch_succeeds() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::added(
                "manga",
                EntityValues::new().with(ID, 1),
            ));
            batch.push(ChangeRecord::added(
                RELEASE,
                EntityValues::new()
                    .with(ID, 50)
                    .with(MEDIA_ID, 1)
                    .with(super::super::IS_PRIMARY, true),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            assert_eq!(store.rows("manga").len(), 1);
            assert_eq!(store.rows(RELEASE).len(), 1);
        });
    }

    #[test]
    fn test_updates_are_not_checked() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row("manga", EntityValues::new().with(ID, 1));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(
                "manga",
                EntityValues::new().with(ID, 1).with("title", "x"),
                EntityValues::new().with(ID, 1),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
        });
    }
}
