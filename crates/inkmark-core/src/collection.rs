//! Id-keyed ordered bookmark collection.
//!
//! The collection is seeded newest-first from a store snapshot and keeps
//! that order by prepending confirmed inserts; it never re-sorts. Every
//! mutation checks presence or absence of the target id first, which makes
//! each path safe to apply zero, one, or more times regardless of how the
//! optimistic and feed-driven sources interleave.

use inkmark_client::Bookmark;

#[derive(Clone, Debug, Default)]
pub struct Collection {
    items: Vec<Bookmark>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a store snapshot, already ordered newest-first.
    #[must_use]
    pub fn from_snapshot(snapshot: Vec<Bookmark>) -> Self {
        Self { items: snapshot }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|b| b.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    /// Prepend unless a record with the same id is already present.
    /// Returns `false` when the insert was a duplicate no-op.
    pub fn insert_front(&mut self, record: Bookmark) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.items.insert(0, record);
        true
    }

    /// Remove by id. Absent is a no-op; returns whether a row was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        self.items.len() < before
    }

    /// Replace the record with a matching id in place, keeping its
    /// position. Returns `false` when the id is unknown; the caller decides
    /// whether that is worth logging.
    pub fn replace(&mut self, record: Bookmark) -> bool {
        match self.items.iter_mut().find(|b| b.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Discard everything and adopt the authoritative snapshot.
    pub fn replace_all(&mut self, snapshot: Vec<Bookmark>) {
        self.items = snapshot;
    }

    /// Cloned view for presentation. No mutable reference ever escapes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.items.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.items.iter()
    }
}
