//! Exactly-one-primary-release enforcement.

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::{Error, Value};

use crate::change::{ChangeKind, ChangeRecord, EntityValues};
use crate::save::{SaveTrigger, TriggerContext};
use crate::store::{Store, StoreSession};

use super::{ID, IS_PRIMARY, MEDIA_ID, RELEASE};

/// Keeps every media's release set consistent: as long as any release
/// survives the save, exactly one of them must be primary.
///
/// The stored release set is loaded and the batch's in-flight changes are
/// overlaid on top before counting, so promote-then-delete inside one
/// batch is judged on the final state. A batch deleting every release is
/// allowed.
#[derive(Debug, Default)]
pub struct PrimaryReleaseTrigger;

#[async_trait]
impl<S: Store> SaveTrigger<S> for PrimaryReleaseTrigger {
    fn name(&self) -> &'static str {
        "primary_release"
    }

    async fn before_save(
        &self,
        cx: &Cx,
        record: &ChangeRecord,
        ctx: &mut TriggerContext<'_, S>,
    ) -> Outcome<(), Error> {
        let mut session = match ctx.store().open(cx).await {
            Outcome::Ok(session) => session,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        // Resolve the owning media. Delete stubs may carry only the key,
        // in which case the stored row supplies the owner.
        let owner = match record.values().get(MEDIA_ID) {
            Some(owner) => owner.clone(),
            None => {
                let Some(id) = record.values().get(ID) else {
                    return Outcome::Err(Error::invalid_operation(
                        "release record carries neither media_id nor id",
                    ));
                };
                let stored = match session.fetch(cx, RELEASE, &[(ID, id.clone())]).await {
                    Outcome::Ok(rows) => rows,
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                };
                match stored.into_iter().next().and_then(|r| r.get(MEDIA_ID).cloned()) {
                    Some(owner) => owner,
                    // Row already gone; nothing to validate.
                    None => return Outcome::Ok(()),
                }
            }
        };

        let stored = match session.fetch(cx, RELEASE, &[(MEDIA_ID, owner.clone())]).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let survivors = overlay(stored, ctx, &owner);
        if survivors.is_empty() {
            return Outcome::Ok(());
        }

        let primaries = survivors
            .iter()
            .filter(|(_, row)| row.get_bool(IS_PRIMARY) == Some(true))
            .count();
        if primaries == 1 {
            Outcome::Ok(())
        } else {
            Outcome::Err(Error::invalid_operation(format!(
                "media {owner:?} would end up with {primaries} primary releases; \
                 exactly one is required while any release exists"
            )))
        }
    }
}

/// Overlay the batch's release changes onto the stored set for one owner.
fn overlay<S: Store>(
    stored: Vec<EntityValues>,
    ctx: &TriggerContext<'_, S>,
    owner: &Value,
) -> Vec<(Value, EntityValues)> {
    let mut set: Vec<(Value, EntityValues)> = stored
        .into_iter()
        .filter_map(|row| row.get(ID).cloned().map(|id| (id, row)))
        .collect();

    for change in ctx.in_flight().filter(|r| r.entity() == RELEASE) {
        let Some(id) = change.values().get(ID).cloned() else {
            continue;
        };
        match change.kind() {
            ChangeKind::Deleted | ChangeKind::Detached => {
                set.retain(|(existing, _)| *existing != id);
            }
            ChangeKind::Added => {
                if change.values().get(MEDIA_ID) == Some(owner) {
                    set.push((id, change.values().clone()));
                }
            }
            ChangeKind::Modified => {
                if let Some((_, row)) = set.iter_mut().find(|(existing, _)| *existing == id) {
                    row.merge(change.values());
                } else if change.values().get(MEDIA_ID) == Some(owner) {
                    set.push((id, change.values().clone()));
                }
            }
        }
    }
    set
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
        model
            .add_entity(mediamodel_core::EntityDescriptor::new(RELEASE, "releases"))
            .unwrap();
        model.freeze();
        let mut registry = TriggerRegistry::new();
        registry.for_entity(RELEASE, Arc::new(PrimaryReleaseTrigger));
        SaveExecutor::new(store, Arc::new(model), registry)
    }

    fn release(id: i64, media: i64, primary: bool) -> EntityValues {
        EntityValues::new()
            .with(ID, id)
            .with(MEDIA_ID, media)
            .with(IS_PRIMARY, primary)
    }

    #[test]
    fn test_two_primaries_abort_the_batch() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(1, 10, true));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::added(RELEASE, release(2, 10, true)));

            let err = unwrap_outcome(executor.save(&cx, batch).await).unwrap_err();
            assert!(err.contains("primary"));
            assert_eq!(store.rows(RELEASE).len(), 1);
        });
    }

    #[test]
    fn test_promote_and_demote_in_one_batch() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(1, 10, true));
            store.insert_row(RELEASE, release(2, 10, false));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(
                RELEASE,
                release(1, 10, false),
                release(1, 10, true),
            ));
            batch.push(ChangeRecord::modified(
                RELEASE,
                release(2, 10, true),
                release(2, 10, false),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
        });
    }

    #[test]
    fn test_promote_then_delete_leaves_one_primary() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(1, 10, true));
            store.insert_row(RELEASE, release(2, 10, false));
            let executor = executor(store.clone());

            // Promote release 2 and delete release 1 in the same batch.
            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::modified(
                RELEASE,
                release(2, 10, true),
                release(2, 10, false),
            ));
            batch.push(ChangeRecord::deleted(
                RELEASE,
                EntityValues::new().with(ID, 1),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            let rows = store.rows(RELEASE);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get_bool(IS_PRIMARY), Some(true));
        });
    }

    #[test]
    fn test_deleting_every_release_is_allowed() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(1, 10, true));
            store.insert_row(RELEASE, release(2, 10, false));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::deleted(
                RELEASE,
                EntityValues::new().with(ID, 1),
            ));
            batch.push(ChangeRecord::deleted(
                RELEASE,
                EntityValues::new().with(ID, 2),
            ));

            unwrap_outcome(executor.save(&cx, batch).await).unwrap();
            assert!(store.rows(RELEASE).is_empty());
        });
    }

    #[test]
    fn test_deleting_the_primary_while_others_remain_aborts() {
        block_on(async {
            let cx = Cx::for_testing();
            let store = MemoryStore::new();
            store.insert_row(RELEASE, release(1, 10, true));
            store.insert_row(RELEASE, release(2, 10, false));
            let executor = executor(store.clone());

            let mut batch = SaveBatch::new();
            batch.push(ChangeRecord::deleted(
                RELEASE,
                EntityValues::new().with(ID, 1).with(MEDIA_ID, 10),
            ));

            let err = unwrap_outcome(executor.save(&cx, batch).await).unwrap_err();
            assert!(err.contains("0 primary releases"));
        });
    }
}
