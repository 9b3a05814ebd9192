//! The store abstraction: a black-box persistence boundary.
//!
//! The trigger framework never sees SQL. It talks to a [`Store`], which
//! hands out single-use [`StoreSession`]s; a session accumulates staged
//! change records and applies them in one atomic commit. Sessions are owned
//! exclusively for one unit of work and released on every exit path by
//! being dropped.

use asupersync::{Cx, Outcome};

use mediamodel_core::{Error, Value};

use crate::change::{ChangeRecord, EntityValues};

/// One unit of work against the store.
pub trait StoreSession: Send {
    /// Read rows of `entity` where every `(column, value)` pair matches.
    fn fetch(
        &mut self,
        cx: &Cx,
        entity: &str,
        filter: &[(&str, Value)],
    ) -> impl Future<Output = Outcome<Vec<EntityValues>, Error>> + Send;

    /// Stage a change for the next commit.
    fn stage(&mut self, record: ChangeRecord);

    /// Apply every staged change atomically. Consumes the session; the
    /// returned count is the number of rows written.
    fn commit(self, cx: &Cx) -> impl Future<Output = Outcome<u64, Error>> + Send;
}

/// A handle that can open sessions. Cheap to share across triggers.
pub trait Store: Send + Sync {
    /// Session type this store hands out.
    type Session: StoreSession;

    /// Open a fresh session.
    fn open(&self, cx: &Cx) -> impl Future<Output = Outcome<Self::Session, Error>> + Send;
}
