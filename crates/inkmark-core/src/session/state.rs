//! Shared session state: the collection and feed health.

use crate::collection::Collection;
use inkmark_client::{Bookmark, ConnectionState};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Single-owner state container for one session.
///
/// The engine loop is the only writer; every lock section is short and
/// never held across an await. Readers only ever get cloned snapshots.
#[derive(Clone)]
pub struct SessionState {
    pub(crate) collection: Arc<RwLock<Collection>>,
    pub(crate) connection: Arc<RwLock<ConnectionState>>,
}

impl SessionState {
    pub(crate) fn new(snapshot: Vec<Bookmark>) -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::from_snapshot(snapshot))),
            connection: Arc::new(RwLock::new(ConnectionState::Connecting)),
        }
    }

    /// Cloned view of the collection, newest-first.
    #[must_use]
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.collection.read().snapshot()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.read()
    }

    pub(crate) fn set_connection(&self, next: ConnectionState) {
        let mut current = self.connection.write();
        if *current != next {
            info!("[Engine] feed {:?} -> {:?}", *current, next);
            *current = next;
        }
    }
}
