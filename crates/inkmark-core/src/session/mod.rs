//! Session lifecycle and the public mutation surface.

mod engine;
mod state;

pub use state::SessionState;

use crate::error::Result;
use crate::meta;
use crate::normalize::normalize_url;
use inkmark_client::{
    Bookmark, BookmarkDraft, ChangeFeed, ConnectionState, StoreGateway,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Options fixed for the lifetime of one session.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// The authenticated user every gateway call and the feed subscription
    /// are scoped to.
    pub user_id: String,
}

/// Commands drained one at a time by the engine loop.
///
/// Gateway awaits happen in the callers' tasks; only settled results are
/// enqueued, so each merge is atomic and always sees current state.
pub(crate) enum Command {
    /// The store confirmed a create; prepend unless the feed won the race.
    InsertConfirmed {
        record: Bookmark,
        done: oneshot::Sender<()>,
    },
    /// Optimistic removal, applied before the delete leaves for the store.
    RemoveOptimistic {
        id: String,
        done: oneshot::Sender<()>,
    },
    /// The store confirmed a delete; sweep the id again in case a stale
    /// feed insert resurrected it mid-flight.
    RemoveConfirmed { id: String },
    /// Adopt a full authoritative snapshot (delete-failure recovery).
    ReplaceAll { snapshot: Vec<Bookmark> },
}

/// Handle to a live reconciliation session.
///
/// Owns one user's collection for the lifetime of the session. Cheap to
/// share behind an `Arc`; all methods take `&self`.
pub struct Session {
    options: SessionOptions,
    state: SessionState,
    store: Arc<dyn StoreGateway>,
    tx: async_channel::Sender<Command>,
}

impl Session {
    /// Seed the collection and start the engine.
    ///
    /// Called exactly once per session. Seeding happens strictly before
    /// the feed subscription is established, so no event ever arrives
    /// against empty base state.
    pub async fn initialize(
        options: SessionOptions,
        snapshot: Vec<Bookmark>,
        store: Arc<dyn StoreGateway>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Result<Self> {
        info!(
            "[Engine] session for {} seeded with {} rows",
            options.user_id,
            snapshot.len()
        );
        let state = SessionState::new(snapshot);
        let subscription = feed.subscribe(&options.user_id).await?;

        let (tx, rx) = async_channel::unbounded();
        tokio::spawn(engine::run(state.clone(), rx, subscription));

        Ok(Self {
            options,
            state,
            store,
            tx,
        })
    }

    /// Validate, persist, and merge one new bookmark.
    ///
    /// No optimistic insert: the server-assigned id is what later feed
    /// events dedup against, so the record only enters the collection once
    /// the store has confirmed it. On failure the collection is untouched.
    pub async fn request_add(
        &self,
        raw_url: &str,
        title_override: Option<&str>,
    ) -> Result<Bookmark> {
        let url = normalize_url(raw_url)?;
        let page = meta::resolve(&url);

        let title = match title_override.map(str::trim) {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => page.title,
        };

        let draft = BookmarkDraft {
            user_id: self.options.user_id.clone(),
            url: url.to_string(),
            title,
            description: None,
            favicon_url: page.favicon_url,
        };

        let record = self.store.create(&draft).await?;

        let (done, ack) = oneshot::channel();
        let sent = self
            .tx
            .send(Command::InsertConfirmed {
                record: record.clone(),
                done,
            })
            .await;
        match sent {
            Ok(()) => {
                let _ = ack.await;
            }
            // Torn down while the create was in flight; the row is durable
            // server-side and the local merge becomes a no-op.
            Err(_) => debug!("[Engine] add for {} settled after teardown", record.id),
        }

        Ok(record)
    }

    /// Remove a bookmark, optimistically first.
    ///
    /// The row disappears from the collection before the network call
    /// resolves. A rejected delete is never reverted locally (the removed
    /// row's position and content may be stale); instead the whole
    /// collection is replaced with the store's authoritative list.
    pub async fn request_delete(&self, id: &str) {
        let (done, ack) = oneshot::channel();
        let sent = self
            .tx
            .send(Command::RemoveOptimistic {
                id: id.to_string(),
                done,
            })
            .await;
        if sent.is_err() {
            debug!("[Engine] delete for {} after teardown ignored", id);
            return;
        }
        let _ = ack.await;

        match self
            .store
            .delete_where(id, &self.options.user_id)
            .await
        {
            Ok(()) => {
                let _ = self
                    .tx
                    .send(Command::RemoveConfirmed { id: id.to_string() })
                    .await;
            }
            Err(e) => {
                warn!("[Engine] delete for {} failed ({}), resyncing", id, e);
                self.resync().await;
            }
        }
    }

    /// Replace local state with the store's authoritative list.
    async fn resync(&self) {
        match self.store.list_by_owner(&self.options.user_id).await {
            Ok(snapshot) => {
                let _ = self.tx.send(Command::ReplaceAll { snapshot }).await;
            }
            // Leave state as-is; the next successful resync or feed
            // delivery corrects it.
            Err(e) => error!("[Engine] resync fetch failed: {}", e),
        }
    }

    /// Cloned view of the collection, newest-first.
    #[must_use]
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.state.bookmarks()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.connection_state()
    }

    /// Read-only handle for presentation layers that outlive borrows of
    /// the session itself.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Stop the loop and release the feed subscription. Idempotent; late
    /// gateway settlements from in-flight calls become no-ops.
    pub fn teardown(&self) {
        self.tx.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
