//! crates/flashcards_core/src/memory.rs
//!
//! An in-process `DocumentStore`. Used when no database is configured and by tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{CollectionEntry, CollectionIndex, StoredCard, UserId};
use crate::ports::{BatchOp, DocumentStore, PortError, PortResult, WriteBatch};

/// The persisted documents, keyed the way the store lays them out:
/// one index per user and one card list per `(user, collection)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub indexes: BTreeMap<UserId, CollectionIndex>,
    pub cards: BTreeMap<(UserId, String), Vec<StoredCard>>,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty() && self.cards.values().all(Vec::is_empty)
    }

    fn apply(&mut self, op: BatchOp) -> PortResult<()> {
        match op {
            BatchOp::InsertIndexEntry { user_id, name } => {
                let index = self.indexes.entry(user_id).or_default();
                if index.contains(&name) {
                    return Err(PortError::Conflict(name));
                }
                index.entries.push(CollectionEntry { name });
            }
            BatchOp::RemoveIndexEntry { user_id, name } => {
                if let Some(index) = self.indexes.get_mut(&user_id) {
                    index.entries.retain(|e| e.name != name);
                }
            }
            BatchOp::SetCard {
                user_id,
                collection,
                card_id,
                card,
            } => {
                let cards = self.cards.entry((user_id, collection)).or_default();
                let stored = StoredCard {
                    id: card_id,
                    front: card.front,
                    back: card.back,
                };
                match cards.iter_mut().find(|c| c.id == card_id) {
                    Some(existing) => *existing = stored,
                    None => cards.push(stored),
                }
            }
            BatchOp::DeleteCard {
                user_id,
                collection,
                card_id,
            } => {
                let key = (user_id, collection);
                if let Some(cards) = self.cards.get_mut(&key) {
                    cards.retain(|c| c.id != card_id);
                    if cards.is_empty() {
                        self.cards.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Inner {
    data: MemorySnapshot,
    index_creations: usize,
    commits: usize,
    fail_next_commit: bool,
}

/// A `DocumentStore` backed by process memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything currently stored.
    pub async fn snapshot(&self) -> MemorySnapshot {
        self.inner.lock().await.data.clone()
    }

    /// How many index documents this store has created.
    pub async fn index_creations(&self) -> usize {
        self.inner.lock().await.index_creations
    }

    /// How many batches were applied successfully.
    pub async fn commits(&self) -> usize {
        self.inner.lock().await.commits
    }

    /// Makes the next `commit` fail without applying anything.
    pub async fn fail_next_commit(&self) {
        self.inner.lock().await.fail_next_commit = true;
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_index(&self, user_id: &UserId) -> PortResult<Option<CollectionIndex>> {
        Ok(self.inner.lock().await.data.indexes.get(user_id).cloned())
    }

    async fn create_index_if_absent(&self, user_id: &UserId) -> PortResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.data.indexes.contains_key(user_id) {
            return Ok(false);
        }
        inner
            .data
            .indexes
            .insert(user_id.clone(), CollectionIndex::default());
        inner.index_creations += 1;
        Ok(true)
    }

    async fn list_cards(&self, user_id: &UserId, collection: &str) -> PortResult<Vec<StoredCard>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .data
            .cards
            .get(&(user_id.clone(), collection.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        if std::mem::take(&mut inner.fail_next_commit) {
            return Err(PortError::Unexpected("simulated commit failure".to_string()));
        }

        // Apply to a copy and swap it in only once every op has succeeded.
        let mut staged = inner.data.clone();
        let mut created = 0;
        for op in batch.into_ops() {
            if let BatchOp::InsertIndexEntry { user_id, .. } = &op {
                if !staged.indexes.contains_key(user_id) {
                    created += 1;
                }
            }
            staged.apply(op)?;
        }

        inner.data = staged;
        inner.index_creations += created;
        inner.commits += 1;
        debug!("Committed batch #{}", inner.commits);
        Ok(())
    }
}
