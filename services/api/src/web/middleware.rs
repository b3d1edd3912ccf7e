//! services/api/src/web/middleware.rs
//!
//! Identity middleware for protecting routes.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use flashcards_core::domain::UserId;
use tracing::warn;

use crate::web::{reject, USER_ID_HEADER};

/// Middleware that reads the caller's identity from the `x-user-id` header.
///
/// The header is set by the upstream identity provider. If present and non-blank,
/// the `UserId` is inserted into request extensions for handlers to use.
/// Otherwise the request is answered with 401 Unauthorized.
pub async fn require_user(mut req: Request, next: Next) -> Response {
    // 1. Extract the identity header
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    // 2. Parse it into a UserId
    let user_id = match UserId::parse(raw) {
        Ok(user_id) => user_id,
        Err(_) => {
            warn!("Rejected {} {} without a user id", req.method(), req.uri().path());
            return reject(StatusCode::UNAUTHORIZED, "Please sign in.").into_response();
        }
    };

    // 3. Insert the user id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    next.run(req).await
}
