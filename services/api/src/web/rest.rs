//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the collection endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    checkout::{CheckoutRequest, CheckoutSessionResponse, CheckoutStatusResponse},
    generate::GenerateRequest,
    port_rejection,
    state::AppState,
    ErrorResponse, HandlerError,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use flashcards_core::domain::{Card, CollectionEntry, StoredCard, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::generate::generate_handler,
        list_collections_handler,
        save_collection_handler,
        get_collection_handler,
        delete_collection_handler,
        crate::web::checkout::create_checkout_handler,
        crate::web::checkout::checkout_status_handler,
    ),
    components(
        schemas(
            CardPayload,
            CollectionSummary,
            SaveCollectionRequest,
            StoredCardResponse,
            GenerateRequest,
            CheckoutRequest,
            CheckoutSessionResponse,
            CheckoutStatusResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Flashcards API", description = "Generate, save and study flashcard collections.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A front/back card pair as it travels over the wire.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct CardPayload {
    pub front: String,
    pub back: String,
}

impl From<Card> for CardPayload {
    fn from(card: Card) -> Self {
        Self {
            front: card.front,
            back: card.back,
        }
    }
}

impl From<CardPayload> for Card {
    fn from(payload: CardPayload) -> Self {
        Card::new(payload.front, payload.back)
    }
}

/// One entry of the caller's collection index.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
}

impl From<CollectionEntry> for CollectionSummary {
    fn from(entry: CollectionEntry) -> Self {
        Self { name: entry.name }
    }
}

/// The payload for saving a previewed set of cards as a named collection.
#[derive(Deserialize, Serialize, ToSchema, Debug)]
pub struct SaveCollectionRequest {
    pub name: String,
    pub cards: Vec<CardPayload>,
}

/// A saved card document.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct StoredCardResponse {
    pub id: Uuid,
    pub front: String,
    pub back: String,
}

impl From<StoredCard> for StoredCardResponse {
    fn from(card: StoredCard) -> Self {
        Self {
            id: card.id,
            front: card.front,
            back: card.back,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the caller's collections. The first call creates an empty index.
#[utoipa::path(
    get,
    path = "/api/collections",
    responses(
        (status = 200, description = "Collections in the order they were saved", body = [CollectionSummary]),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn list_collections_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<CollectionSummary>>, HandlerError> {
    let entries = app_state
        .repository
        .list_collections(&user_id)
        .await
        .map_err(|e| port_rejection(e, "An error occurred while loading your collections."))?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Save cards as a new named collection.
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = SaveCollectionRequest,
    responses(
        (status = 201, description = "Collection saved", body = CollectionSummary),
        (status = 400, description = "Missing or invalid name", body = ErrorResponse),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 409, description = "A collection with this name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn save_collection_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    Json(req): Json<SaveCollectionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let cards: Vec<Card> = req.cards.into_iter().map(Into::into).collect();
    let entry = app_state
        .repository
        .save_collection(&user_id, &req.name, &cards)
        .await
        .map_err(|e| port_rejection(e, "An error occurred while saving the collection."))?;

    Ok((StatusCode::CREATED, Json(CollectionSummary::from(entry))))
}

/// Fetch the cards of one collection.
#[utoipa::path(
    get,
    path = "/api/collections/{name}",
    responses(
        (status = 200, description = "Cards in the order they were saved", body = [StoredCardResponse]),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("name" = String, Path, description = "The collection name."),
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn get_collection_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    Path(name): Path<String>,
) -> Result<Json<Vec<StoredCardResponse>>, HandlerError> {
    let cards = app_state
        .repository
        .get_collection(&user_id, &name)
        .await
        .map_err(|e| port_rejection(e, "An error occurred while loading the collection."))?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

/// Delete a collection and all of its cards.
#[utoipa::path(
    delete,
    path = "/api/collections/{name}",
    responses(
        (status = 204, description = "Collection deleted, or there was nothing to delete"),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("name" = String, Path, description = "The collection name."),
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn delete_collection_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    Path(name): Path<String>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .repository
        .delete_collection(&user_id, &name)
        .await
        .map_err(|e| port_rejection(e, "An error occurred while deleting the collection."))?;

    Ok(StatusCode::NO_CONTENT)
}
