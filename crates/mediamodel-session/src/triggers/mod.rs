//! The catalog's concrete save triggers.
//!
//! Column names here follow the catalog schema: releases and list entries
//! hang off an owning media row through `media_id`, related-media links
//! are a self-referencing `source_id`/`target_id` pair, and episodes
//! reference songs through nullable `opening_song_id`/`ending_song_id`.

mod primary_release;
mod progress_clamp;
mod related_media;
mod release_required;
mod song_reference;

pub use primary_release::PrimaryReleaseTrigger;
pub use progress_clamp::ProgressClampTrigger;
pub use related_media::RelatedMediaCascadeTrigger;
pub use release_required::ReleaseRequiredTrigger;
pub use song_reference::SongReferenceClearTrigger;

pub(crate) const ID: &str = "id";
pub(crate) const MEDIA_ID: &str = "media_id";
pub(crate) const IS_PRIMARY: &str = "is_primary";
pub(crate) const EPISODE_COUNT: &str = "episode_count";
pub(crate) const PROGRESS: &str = "progress";
pub(crate) const STATUS: &str = "status";
pub(crate) const SOURCE_ID: &str = "source_id";
pub(crate) const TARGET_ID: &str = "target_id";
pub(crate) const OPENING_SONG_ID: &str = "opening_song_id";
pub(crate) const ENDING_SONG_ID: &str = "ending_song_id";

pub(crate) const RELEASE: &str = "release";
pub(crate) const LIST_ENTRY: &str = "list_entry";
pub(crate) const RELATED_MEDIA: &str = "related_media";
pub(crate) const EPISODE: &str = "episode";

pub(crate) const STATUS_COMPLETE: &str = "complete";
pub(crate) const STATUS_PAUSED: &str = "paused";
