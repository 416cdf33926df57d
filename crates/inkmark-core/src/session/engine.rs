//! The serialized mutation loop.
//!
//! One task drains commands and feed messages one at a time, so every merge
//! runs atomically against current state. Gateway and resolver awaits live
//! in the callers' tasks; only their already-settled results ever enter the
//! queue.

use crate::session::state::SessionState;
use crate::session::Command;
use inkmark_client::{ConnectionState, FeedEvent, FeedMessage, FeedSubscription};
use tracing::{debug, info, warn};

pub(crate) async fn run(
    state: SessionState,
    rx: async_channel::Receiver<Command>,
    mut feed: FeedSubscription,
) {
    let mut feed_open = true;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Ok(cmd) => apply_command(&state, cmd),
                Err(_) => break,
            },
            msg = feed.next(), if feed_open => match msg {
                Some(FeedMessage::Change(event)) => apply_feed_event(&state, event),
                Some(FeedMessage::Status(next)) => state.set_connection(next),
                None => {
                    // Mutations keep flowing through the gateway directly.
                    warn!("[Engine] feed channel closed");
                    state.set_connection(ConnectionState::Degraded);
                    feed_open = false;
                }
            },
        }
    }

    feed.unsubscribe();
    debug!("[Engine] session loop stopped");
}

fn apply_command(state: &SessionState, cmd: Command) {
    match cmd {
        Command::InsertConfirmed { record, done } => {
            let id = record.id.clone();
            if !state.collection.write().insert_front(record) {
                debug!("[Engine] create for {} already applied by feed", id);
            }
            let _ = done.send(());
        }
        Command::RemoveOptimistic { id, done } => {
            state.collection.write().remove(&id);
            let _ = done.send(());
        }
        Command::RemoveConfirmed { id } => {
            // A stale feed insert may have resurrected the row between the
            // optimistic removal and the gateway confirmation.
            if state.collection.write().remove(&id) {
                debug!("[Engine] swept {} again after delete confirmation", id);
            }
        }
        Command::ReplaceAll { snapshot } => {
            info!(
                "[Engine] replacing collection with {} rows from store",
                snapshot.len()
            );
            state.collection.write().replace_all(snapshot);
        }
    }
}

fn apply_feed_event(state: &SessionState, event: FeedEvent) {
    match event {
        FeedEvent::Insert(record) => {
            let id = record.id.clone();
            if !state.collection.write().insert_front(record) {
                debug!("[Engine] duplicate feed insert for {} dropped", id);
            }
        }
        FeedEvent::Delete { id } => {
            if !state.collection.write().remove(&id) {
                debug!("[Engine] feed delete for unknown id {} ignored", id);
            }
        }
        FeedEvent::Update(record) => {
            let id = record.id.clone();
            // No implicit insert: an update for an id we never saw signals
            // a missed insert and is left for redelivery or a full refresh.
            if !state.collection.write().replace(record) {
                warn!("[Engine] feed update for unknown id {} dropped", id);
            }
        }
    }
}
