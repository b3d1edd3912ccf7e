//! crates/flashcards_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the document database, the LLM and the payments provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Card, CheckoutSession, CheckoutStatus, CollectionIndex, Plan, StoredCard, UserId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Write Batches
//=========================================================================================

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Appends `name` to the user's index, creating the index if it is missing.
    /// Fails the whole batch with [`PortError::Conflict`] if the name is already present.
    InsertIndexEntry { user_id: UserId, name: String },
    /// Removes `name` from the user's index. Absent names are ignored.
    RemoveIndexEntry { user_id: UserId, name: String },
    /// Writes a card document into the collection's sub-collection.
    SetCard {
        user_id: UserId,
        collection: String,
        card_id: Uuid,
        card: Card,
    },
    /// Deletes a card document. Missing documents are ignored.
    DeleteCard {
        user_id: UserId,
        collection: String,
        card_id: Uuid,
    },
}

/// An ordered list of writes that the store applies atomically: all or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: BatchOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a user's collection index. `None` means the index was never created.
    async fn get_index(&self, user_id: &UserId) -> PortResult<Option<CollectionIndex>>;

    /// Creates an empty index. Returns `true` only if this call created it.
    async fn create_index_if_absent(&self, user_id: &UserId) -> PortResult<bool>;

    /// Lists the card documents of one collection in insertion order.
    async fn list_cards(&self, user_id: &UserId, collection: &str) -> PortResult<Vec<StoredCard>>;

    /// Applies every op of the batch, or none of them.
    async fn commit(&self, batch: WriteBatch) -> PortResult<()>;
}

#[async_trait]
pub trait FlashcardGenerator: Send + Sync {
    /// Turns free text into an ordered list of cards.
    async fn generate(&self, text: &str) -> PortResult<Vec<Card>>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Opens a hosted checkout session for the given plan.
    async fn create_checkout_session(&self, plan: Plan) -> PortResult<CheckoutSession>;

    /// Looks up the payment state of an existing checkout session.
    async fn get_checkout_session(&self, session_id: &str) -> PortResult<CheckoutStatus>;
}
