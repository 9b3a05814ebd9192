//! Save pipeline: change tracking, the store boundary, and triggers.
//!
//! # Role In The Architecture
//!
//! `mediamodel-session` owns everything between "the application decided
//! what changed" and "rows hit the store":
//!
//! - [`ChangeRecord`]/[`SaveBatch`] describe one save's worth of changes,
//! - [`Store`]/[`StoreSession`] are the black-box persistence boundary
//!   (the in-repo [`MemoryStore`] implements them for tests and embedded
//!   callers),
//! - [`SaveTrigger`]s hook the pipeline, registered per entity or per
//!   capability in a [`TriggerRegistry`],
//! - [`SaveExecutor`] drives a batch through the phases and returns a
//!   [`SaveReport`].
//!
//! Before-save triggers can veto the whole batch; after-save triggers run
//! only once the primary commit succeeded, and their failures are reported
//! but never rolled back. The concrete catalog triggers live in
//! [`triggers`].
//!
//! # Who Uses This Crate
//!
//! The application's persistence layer builds one [`SaveExecutor`] per
//! store at startup and funnels every save through it.

pub mod change;
pub mod memory;
pub mod registry;
pub mod save;
pub mod store;
pub mod triggers;

pub use change::{ChangeKind, ChangeRecord, EntityValues, SaveBatch};
pub use memory::{MemorySession, MemoryStore};
pub use registry::{TriggerKey, TriggerRegistry};
pub use save::{SaveExecutor, SaveReport, SaveTrigger, SecondaryFailure, TriggerContext};
pub use store::{Store, StoreSession};

pub use asupersync::{Cx, Outcome};
