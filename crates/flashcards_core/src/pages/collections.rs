//! The `/flashcards` page: the user's saved collections.

use tracing::error;

use crate::domain::CollectionEntry;
use crate::pages::{AuthSnapshot, Notification, PageStatus, Route};
use crate::repository::CollectionRepository;

pub struct CollectionsPage {
    auth: AuthSnapshot,
    repository: CollectionRepository,
    collections: Vec<CollectionEntry>,
    pub notification: Notification,
}

impl CollectionsPage {
    pub fn new(auth: AuthSnapshot, repository: CollectionRepository) -> Self {
        Self {
            auth,
            repository,
            collections: Vec::new(),
            notification: Notification::default(),
        }
    }

    pub fn status(&self) -> PageStatus {
        self.auth.status()
    }

    pub fn collections(&self) -> &[CollectionEntry] {
        &self.collections
    }

    pub async fn load(&mut self) {
        let Some(user) = self.auth.user.as_ref() else {
            return;
        };
        match self.repository.list_collections(user).await {
            Ok(collections) => self.collections = collections,
            Err(e) => {
                error!("Failed to load collections: {:?}", e);
                self.notification
                    .show("An error occurred while loading your collections.");
            }
        }
    }

    pub async fn delete(&mut self, name: &str) {
        let Some(user) = self.auth.user.as_ref() else {
            return;
        };
        match self.repository.delete_collection(user, name).await {
            Ok(()) => {
                self.collections.retain(|c| c.name != name);
                self.notification
                    .show("Flashcard collection deleted successfully.");
            }
            Err(e) => {
                error!("Failed to delete collection '{}': {:?}", name, e);
                self.notification
                    .show("An error occurred while deleting the collection.");
            }
        }
    }

    pub fn open(&self, name: &str) -> Route {
        Route::Flashcard {
            name: name.to_string(),
        }
    }

    pub fn unauthenticated_route(&self) -> Option<Route> {
        match self.status() {
            PageStatus::Unauthenticated => Some(Route::SignIn),
            _ => None,
        }
    }
}
