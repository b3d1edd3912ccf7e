pub mod domain;
pub mod generation;
pub mod memory;
pub mod pages;
pub mod ports;
pub mod repository;

pub use domain::{
    Card, CheckoutSession, CheckoutStatus, CollectionEntry, CollectionIndex, CollectionName, Plan,
    StoredCard, UserId,
};
pub use generation::{decode_cards, GenerationOutcome};
pub use memory::MemoryDocumentStore;
pub use ports::{
    BatchOp, DocumentStore, FlashcardGenerator, PaymentService, PortError, PortResult, WriteBatch,
};
pub use repository::CollectionRepository;
