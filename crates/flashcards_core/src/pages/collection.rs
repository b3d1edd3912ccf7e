//! The `/flashcard?id=<name>` page: one saved collection with flippable cards.

use tracing::error;

use crate::domain::{Card, StoredCard};
use crate::pages::{card_faces, AuthSnapshot, CardFace, FlipState, Notification, PageStatus};
use crate::repository::CollectionRepository;

pub struct CollectionPage {
    auth: AuthSnapshot,
    repository: CollectionRepository,
    name: Option<String>,
    cards: Vec<Card>,
    flips: FlipState,
    pub notification: Notification,
}

impl CollectionPage {
    /// `name` is the `id` query parameter; a missing one leaves the page empty.
    pub fn new(auth: AuthSnapshot, repository: CollectionRepository, name: Option<String>) -> Self {
        Self {
            auth,
            repository,
            name,
            cards: Vec::new(),
            flips: FlipState::default(),
            notification: Notification::default(),
        }
    }

    pub fn status(&self) -> PageStatus {
        self.auth.status()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
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

    pub async fn load(&mut self) {
        let (Some(user), Some(name)) = (self.auth.user.as_ref(), self.name.as_deref()) else {
            return;
        };
        match self.repository.get_collection(user, name).await {
            Ok(stored) => {
                self.cards = stored.iter().map(StoredCard::card).collect();
                self.flips.reset();
            }
            Err(e) => {
                error!("Failed to load collection '{}': {:?}", name, e);
                self.notification
                    .show("An error occurred while loading the collection.");
            }
        }
    }
}
