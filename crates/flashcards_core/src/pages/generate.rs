//! The `/generate` page: paste text, preview the generated cards, save them.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::{Card, UserId};
use crate::pages::{card_faces, AuthSnapshot, CardFace, FlipState, Notification, PageStatus, Route};
use crate::ports::{FlashcardGenerator, PortError};
use crate::repository::CollectionRepository;

pub struct GeneratePage {
    auth: AuthSnapshot,
    generator: Arc<dyn FlashcardGenerator>,
    repository: CollectionRepository,
    pub text: String,
    pub name: String,
    cards: Vec<Card>,
    flips: FlipState,
    dialog_open: bool,
    pub notification: Notification,
}

impl GeneratePage {
    pub fn new(
        auth: AuthSnapshot,
        generator: Arc<dyn FlashcardGenerator>,
        repository: CollectionRepository,
    ) -> Self {
        Self {
            auth,
            generator,
            repository,
            text: String::new(),
            name: String::new(),
            cards: Vec::new(),
            flips: FlipState::default(),
            dialog_open: false,
            notification: Notification::default(),
        }
    }

    pub fn status(&self) -> PageStatus {
        self.auth.status()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn faces(&self) -> Vec<CardFace<'_>> {
        card_faces(&self.cards, &self.flips)
    }

    pub fn toggle_card(&mut self, index: usize) {
        self.flips.toggle(index);
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Sends the pasted text off for generation and replaces the preview.
    pub async fn submit(&mut self) {
        if self.text.trim().is_empty() {
            self.notification.show("Please enter some text to generate flashcards.");
            return;
        }

        match self.generator.generate(&self.text).await {
            Ok(cards) => {
                self.cards = cards;
                self.flips.reset();
            }
            Err(e) => {
                error!("Flashcard generation failed: {:?}", e);
                self.cards.clear();
                self.flips.reset();
                self.notification
                    .show("An error occurred while generating flashcards. Please try again.");
            }
        }
    }

    pub fn open_save_dialog(&mut self) {
        self.dialog_open = true;
    }

    pub fn close_save_dialog(&mut self) {
        self.dialog_open = false;
    }

    /// Saves the preview as a named collection.
    ///
    /// Returns the route to navigate to on success, `None` if the save was refused.
    pub async fn save(&mut self) -> Option<Route> {
        let Some(user) = self.auth.user.clone() else {
            warn!("Save attempted without a signed-in user");
            self.notification.show("Please sign in to save flashcards.");
            return None;
        };
        self.save_as(&user).await
    }

    async fn save_as(&mut self, user: &UserId) -> Option<Route> {
        match self
            .repository
            .save_collection(user, &self.name, &self.cards)
            .await
        {
            Ok(_) => {
                self.dialog_open = false;
                Some(Route::Flashcards)
            }
            Err(PortError::InvalidInput(message)) | Err(PortError::Conflict(message)) => {
                self.notification.show(message);
                None
            }
            Err(_) => {
                self.notification
                    .show("An error occurred while saving the collection.");
                None
            }
        }
    }
}
