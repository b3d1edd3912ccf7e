//! crates/flashcards_core/src/pages/mod.rs
//!
//! View-models for each page of the app. Each one is constructed with the
//! caller's identity and the ports it needs, holds only transient state, and
//! can be driven without a browser.

use std::collections::HashMap;

use crate::domain::{Card, UserId};

pub mod collection;
pub mod collections;
pub mod generate;
pub mod home;
pub mod result;

pub use collection::CollectionPage;
pub use collections::CollectionsPage;
pub use generate::GeneratePage;
pub use home::HomePage;
pub use result::{ResultPage, ResultState};

//=========================================================================================
// Identity Gating
//=========================================================================================

/// What the identity provider has told us so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub is_loaded: bool,
    pub user: Option<UserId>,
}

impl AuthSnapshot {
    pub fn signed_in(user: UserId) -> Self {
        Self {
            is_loaded: true,
            user: Some(user),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            is_loaded: true,
            user: None,
        }
    }

    pub fn status(&self) -> PageStatus {
        match (self.is_loaded, &self.user) {
            (false, _) => PageStatus::Loading,
            (true, None) => PageStatus::Unauthenticated,
            (true, Some(_)) => PageStatus::Ready,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Loading,
    Unauthenticated,
    Ready,
}

//=========================================================================================
// Card Flipping
//=========================================================================================

/// Which preview cards are showing their back. Cosmetic only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipState {
    flipped: HashMap<usize, bool>,
}

impl FlipState {
    pub fn toggle(&mut self, index: usize) {
        let entry = self.flipped.entry(index).or_insert(false);
        *entry = !*entry;
    }

    pub fn is_flipped(&self, index: usize) -> bool {
        self.flipped.get(&index).copied().unwrap_or(false)
    }

    pub fn reset(&mut self) {
        self.flipped.clear();
    }
}

/// The face of a card currently facing the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardFace<'a> {
    pub index: usize,
    pub flipped: bool,
    pub text: &'a str,
}

/// Renders every card with the side its flip state selects.
pub fn card_faces<'a>(cards: &'a [Card], flips: &FlipState) -> Vec<CardFace<'a>> {
    cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let flipped = flips.is_flipped(index);
            CardFace {
                index,
                flipped,
                text: if flipped { card.back.as_str() } else { card.front.as_str() },
            }
        })
        .collect()
}

//=========================================================================================
// Notifications
//=========================================================================================

/// A single transient message. A new message replaces the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    message: Option<String>,
}

impl Notification {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

//=========================================================================================
// Routes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Generate,
    Flashcards,
    Flashcard { name: String },
    Result { session_id: String },
    SignIn,
    SignUp,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Generate => "/generate".to_string(),
            Route::Flashcards => "/flashcards".to_string(),
            Route::Flashcard { name } => format!("/flashcard?id={}", urlencoding::encode(name)),
            Route::Result { session_id } => {
                format!("/result?session_id={}", urlencoding::encode(session_id))
            }
            Route::SignIn => "/sign-in".to_string(),
            Route::SignUp => "/sign-up".to_string(),
        }
    }
}
