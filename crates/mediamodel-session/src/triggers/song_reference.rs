//! Clearing episode references to deleted songs.

use async_trait::async_trait;
use asupersync::{Cx, Outcome};

use mediamodel_core::{Error, Value};

use crate::change::{ChangeKind, ChangeRecord, EntityValues};
use crate::save::SaveTrigger;
use crate::store::{Store, StoreSession};

use super::{ENDING_SONG_ID, EPISODE, ID, OPENING_SONG_ID};

/// After a song is deleted, nulls `opening_song_id` / `ending_song_id` on
/// every episode that referenced it.
///
/// Runs as a secondary effect: the song delete has already committed when
/// this fires. The episode updates go through their own session and
/// commit; if they fail, the save still succeeded and the failure is
/// surfaced in the report (and fixable by a re-run or a cleanup job),
/// rather than rolling back the delete.
#[derive(Debug, Default)]
pub struct SongReferenceClearTrigger;

#[async_trait]
impl<S: Store> SaveTrigger<S> for SongReferenceClearTrigger {
    fn name(&self) -> &'static str {
        "song_reference_clear"
    }

    async fn after_save(&self, cx: &Cx, record: &ChangeRecord, store: &S) -> Outcome<(), Error> {
        if record.kind() != ChangeKind::Deleted {
            return Outcome::Ok(());
        }
        let Some(song_id) = record.values().get(ID).cloned() else {
            return Outcome::Err(Error::invalid_operation("song delete record carries no id"));
        };

        let mut session = match store.open(cx).await {
            Outcome::Ok(session) => session,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let mut cleared = 0usize;
        for column in [OPENING_SONG_ID, ENDING_SONG_ID] {
            let episodes = match session.fetch(cx, EPISODE, &[(column, song_id.clone())]).await {
                Outcome::Ok(rows) => rows,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            for episode in episodes {
                let Some(episode_id) = episode.get(ID).cloned() else {
                    continue;
                };
                session.stage(ChangeRecord::modified(
                    EPISODE,
                    EntityValues::new()
                        .with(ID, episode_id)
                        .with(column, Value::Null),
                    episode,
                ));
                cleared += 1;
            }
        }
        if cleared == 0 {
            return Outcome::Ok(());
        }

        match session.commit(cx).await {
            Outcome::Ok(_) => {
                tracing::debug!(song = ?song_id, cleared, "cleared episode song references");
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }
}
