//! services/api/src/web/generate.rs
//!
//! The text-to-flashcards endpoint.

use crate::web::{port_rejection, reject, rest::CardPayload, state::AppState, ErrorResponse, HandlerError};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use bytes::Bytes;
use flashcards_core::{domain::UserId, ports::PortError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

/// The JSON form of a generation request.
#[derive(Deserialize, ToSchema, Debug)]
pub struct GenerateRequest {
    pub text: String,
}

/// Reads the text to generate from, accepting a `{"text"}` JSON body or raw text.
fn extract_text(headers: &HeaderMap, body: &[u8]) -> Result<String, HandlerError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    let text = if is_json {
        serde_json::from_slice::<GenerateRequest>(body)
            .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e)))?
            .text
    } else {
        String::from_utf8(body.to_vec()).map_err(|_| {
            reject(StatusCode::BAD_REQUEST, "Request body is not valid UTF-8 text")
        })?
    };

    if text.trim().is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Please enter some text to generate flashcards.",
        ));
    }
    Ok(text)
}

/// Turn pasted text into an ordered list of flashcards.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body(content = GenerateRequest, description = "JSON `{\"text\"}`; a raw text/plain body is also accepted."),
    responses(
        (status = 200, description = "Generated cards, in order", body = [CardPayload]),
        (status = 400, description = "Empty or unreadable text", body = ErrorResponse),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 502, description = "The generator failed or answered nonsense", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<CardPayload>>, HandlerError> {
    let text = extract_text(&headers, &body)?;
    info!("Generating flashcards for user {} from {} chars", user_id, text.len());

    let cards = app_state.generator.generate(&text).await.map_err(|e| {
        let e = match e {
            PortError::InvalidInput(_) | PortError::MalformedResponse(_) => e,
            // Upstream trouble is a gateway failure, not ours.
            other => PortError::MalformedResponse(other.to_string()),
        };
        port_rejection(e, "An error occurred while generating flashcards. Please try again.")
    })?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}
