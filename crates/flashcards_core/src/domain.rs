//! crates/flashcards_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ports::PortError;

/// The longest collection name the store accepts.
pub const MAX_COLLECTION_NAME_LEN: usize = 100;

/// Opaque identifier handed to us by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw id, rejecting blank values.
    pub fn parse(raw: &str) -> Result<Self, PortError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PortError::Unauthorized);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A front/back text pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub front: String,
    pub back: String,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A card document as it lives inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
}

impl StoredCard {
    pub fn card(&self) -> Card {
        Card::new(self.front.clone(), self.back.clone())
    }
}

/// One entry of a user's collection index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub name: String,
}

/// The per-user document listing collection names, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionIndex {
    pub entries: Vec<CollectionEntry>,
}

impl CollectionIndex {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}

/// A collection name that has passed validation.
///
/// Names are trimmed, must not be empty, must fit in
/// [`MAX_COLLECTION_NAME_LEN`] characters and must not contain `/`, since the
/// name doubles as the path segment of the card sub-collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    /// The form a name is stored under. Lookups and deletes key on this.
    pub fn normalize(raw: &str) -> &str {
        raw.trim()
    }

    pub fn parse(raw: &str) -> Result<Self, PortError> {
        let name = Self::normalize(raw);
        if name.is_empty() {
            return Err(PortError::InvalidInput(
                "Please enter a name".to_string(),
            ));
        }
        if name.chars().count() > MAX_COLLECTION_NAME_LEN {
            return Err(PortError::InvalidInput(format!(
                "Collection names are limited to {} characters",
                MAX_COLLECTION_NAME_LEN
            )));
        }
        if name.contains('/') {
            return Err(PortError::InvalidInput(
                "Collection names cannot contain '/'".to_string(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A purchasable subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Pro,
}

impl Plan {
    pub fn parse(raw: &str) -> Result<Self, PortError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            other => Err(PortError::InvalidInput(format!("Unknown plan '{}'", other))),
        }
    }

    /// Monthly price in US cents.
    pub fn unit_amount_cents(self) -> u64 {
        match self {
            Plan::Basic => 500,
            Plan::Pro => 1000,
        }
    }

    pub fn product_name(self) -> &'static str {
        match self {
            Plan::Basic => "Basic subscription",
            Plan::Pro => "Pro subscription",
        }
    }
}

/// A hosted checkout session the browser is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// The state of a checkout session as reported by the payments provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStatus {
    pub id: String,
    pub payment_status: String,
}

impl CheckoutStatus {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}
