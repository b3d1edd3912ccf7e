//! crates/flashcards_core/src/repository.rs
//!
//! The Collection Repository: the one place that reads and writes a user's
//! collection index and card documents. Web handlers and page view-models
//! both go through it.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{Card, CollectionEntry, CollectionName, StoredCard, UserId};
use crate::ports::{BatchOp, DocumentStore, PortError, PortResult, WriteBatch};

#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
}

impl CollectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists the user's collections, creating an empty index on first access.
    pub async fn list_collections(&self, user_id: &UserId) -> PortResult<Vec<CollectionEntry>> {
        match self.store.get_index(user_id).await.map_err(log_store_error)? {
            Some(index) => Ok(index.entries),
            None => {
                if self
                    .store
                    .create_index_if_absent(user_id)
                    .await
                    .map_err(log_store_error)?
                {
                    info!("Created empty collection index for user {}", user_id);
                }
                Ok(Vec::new())
            }
        }
    }

    /// Saves `cards` as a new collection called `name`.
    ///
    /// The index entry and every card document go out in one batch. A name
    /// that already exists fails with [`PortError::Conflict`] and writes nothing.
    pub async fn save_collection(
        &self,
        user_id: &UserId,
        name: &str,
        cards: &[Card],
    ) -> PortResult<CollectionEntry> {
        let name = CollectionName::parse(name)?;

        let mut batch = WriteBatch::new();
        batch.push(BatchOp::InsertIndexEntry {
            user_id: user_id.clone(),
            name: name.as_str().to_string(),
        });
        for card in cards {
            batch.push(BatchOp::SetCard {
                user_id: user_id.clone(),
                collection: name.as_str().to_string(),
                card_id: Uuid::new_v4(),
                card: card.clone(),
            });
        }

        match self.store.commit(batch).await {
            Ok(()) => {
                info!(
                    "Saved collection '{}' with {} cards for user {}",
                    name,
                    cards.len(),
                    user_id
                );
                Ok(CollectionEntry {
                    name: name.as_str().to_string(),
                })
            }
            Err(PortError::Conflict(_)) => Err(PortError::Conflict(
                "Flashcard collection with the same name already exists.".to_string(),
            )),
            Err(e) => Err(log_store_error(e)),
        }
    }

    /// Removes the collection's index entry and every card document in one batch.
    ///
    /// Missing index documents make this a no-op.
    pub async fn delete_collection(&self, user_id: &UserId, name: &str) -> PortResult<()> {
        let name = CollectionName::normalize(name);
        if self
            .store
            .get_index(user_id)
            .await
            .map_err(log_store_error)?
            .is_none()
        {
            return Ok(());
        }

        let cards = self
            .store
            .list_cards(user_id, name)
            .await
            .map_err(log_store_error)?;

        let mut batch = WriteBatch::new();
        batch.push(BatchOp::RemoveIndexEntry {
            user_id: user_id.clone(),
            name: name.to_string(),
        });
        for card in &cards {
            batch.push(BatchOp::DeleteCard {
                user_id: user_id.clone(),
                collection: name.to_string(),
                card_id: card.id,
            });
        }

        self.store.commit(batch).await.map_err(log_store_error)?;
        info!(
            "Deleted collection '{}' ({} cards) for user {}",
            name,
            cards.len(),
            user_id
        );
        Ok(())
    }

    /// Returns the card documents of one collection.
    pub async fn get_collection(&self, user_id: &UserId, name: &str) -> PortResult<Vec<StoredCard>> {
        self.store
            .list_cards(user_id, CollectionName::normalize(name))
            .await
            .map_err(log_store_error)
    }
}

fn log_store_error(e: PortError) -> PortError {
    error!("Document store operation failed: {:?}", e);
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocumentStore;

    fn user() -> UserId {
        UserId::parse("user_1").unwrap()
    }

    fn repo() -> (Arc<MemoryDocumentStore>, CollectionRepository) {
        let store = Arc::new(MemoryDocumentStore::new());
        (store.clone(), CollectionRepository::new(store))
    }

    #[tokio::test]
    async fn list_on_new_user_creates_index_once() {
        let (store, repo) = repo();
        assert!(repo.list_collections(&user()).await.unwrap().is_empty());
        assert!(repo.list_collections(&user()).await.unwrap().is_empty());
        assert_eq!(store.index_creations().await, 1);
    }

    #[tokio::test]
    async fn save_appends_entry_and_writes_every_card() {
        let (store, repo) = repo();
        let cards = vec![Card::new("Q1", "A1"), Card::new("Q2", "A2"), Card::new("Q3", "A3")];
        repo.save_collection(&user(), "Biology", &cards).await.unwrap();

        let names = repo.list_collections(&user()).await.unwrap();
        assert_eq!(names, vec![CollectionEntry { name: "Biology".into() }]);

        let stored = repo.get_collection(&user(), "Biology").await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.iter().map(StoredCard::card).collect::<Vec<_>>(), cards);
        assert_eq!(store.index_creations().await, 1);
    }

    #[tokio::test]
    async fn duplicate_name_leaves_store_unchanged() {
        let (store, repo) = repo();
        repo.save_collection(&user(), "Biology", &[Card::new("Q1", "A1")])
            .await
            .unwrap();
        let before = store.snapshot().await;

        let err = repo
            .save_collection(&user(), " Biology ", &[Card::new("Q2", "A2")])
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_write() {
        let (store, repo) = repo();
        let err = repo
            .save_collection(&user(), "  ", &[Card::new("Q", "A")])
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
        assert_eq!(store.commits().await, 0);
    }

    #[tokio::test]
    async fn failed_commit_writes_nothing() {
        let (store, repo) = repo();
        store.fail_next_commit().await;
        let err = repo
            .save_collection(&user(), "Biology", &[Card::new("Q", "A"), Card::new("Q2", "A2")])
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
        assert!(repo.get_collection(&user(), "Biology").await.unwrap().is_empty());
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_entry_and_cards() {
        let (_store, repo) = repo();
        repo.save_collection(&user(), "Biology", &[Card::new("Q1", "A1"), Card::new("Q2", "A2")])
            .await
            .unwrap();
        repo.save_collection(&user(), "History", &[Card::new("Q", "A")])
            .await
            .unwrap();

        repo.delete_collection(&user(), "Biology").await.unwrap();

        let names = repo.list_collections(&user()).await.unwrap();
        assert_eq!(names, vec![CollectionEntry { name: "History".into() }]);
        assert!(repo.get_collection(&user(), "Biology").await.unwrap().is_empty());
        assert_eq!(repo.get_collection(&user(), "History").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn padded_name_reaches_the_trimmed_collection() {
        let (store, repo) = repo();
        repo.save_collection(&user(), " Biology ", &[Card::new("Q1", "A1"), Card::new("Q2", "A2")])
            .await
            .unwrap();
        assert_eq!(repo.get_collection(&user(), " Biology ").await.unwrap().len(), 2);

        repo.delete_collection(&user(), " Biology ").await.unwrap();

        assert!(repo.list_collections(&user()).await.unwrap().is_empty());
        assert!(repo.get_collection(&user(), "Biology").await.unwrap().is_empty());
        assert!(store.snapshot().await.cards.is_empty());
    }

    #[tokio::test]
    async fn delete_without_index_is_a_noop() {
        let (store, repo) = repo();
        repo.delete_collection(&user(), "Nothing").await.unwrap();
        assert_eq!(store.commits().await, 0);
        assert_eq!(store.index_creations().await, 0);
    }

    #[tokio::test]
    async fn delete_of_unknown_name_is_not_an_error() {
        let (_store, repo) = repo();
        repo.save_collection(&user(), "Biology", &[Card::new("Q", "A")])
            .await
            .unwrap();
        repo.delete_collection(&user(), "Chemistry").await.unwrap();
        assert_eq!(repo.list_collections(&user()).await.unwrap().len(), 1);
    }
}
