//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use flashcards_core::ports::{FlashcardGenerator, PaymentService};
use flashcards_core::repository::CollectionRepository;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: CollectionRepository,
    pub generator: Arc<dyn FlashcardGenerator>,
    /// `None` when no payments provider is configured.
    pub payments: Option<Arc<dyn PaymentService>>,
    pub config: Arc<Config>,
}
