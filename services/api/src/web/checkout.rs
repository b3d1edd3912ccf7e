//! services/api/src/web/checkout.rs
//!
//! Checkout endpoints: open a hosted checkout session for a plan, and report
//! the payment status once the browser returns to the result page.

use crate::web::{port_rejection, reject, state::AppState, ErrorResponse, HandlerError};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use flashcards_core::{
    domain::{Plan, UserId},
    ports::{PaymentService, PortError},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema, Debug)]
pub struct CheckoutRequest {
    /// `basic` or `pro`.
    pub plan: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CheckoutStatusResponse {
    pub id: String,
    pub payment_status: String,
}

#[derive(Deserialize, Debug)]
pub struct CheckoutQuery {
    pub session_id: Option<String>,
}

fn payments(app_state: &AppState) -> Result<&Arc<dyn PaymentService>, HandlerError> {
    app_state.payments.as_ref().ok_or_else(|| {
        reject(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments are not configured.",
        )
    })
}

/// Upstream payment failures are gateway errors.
fn upstream(e: PortError) -> PortError {
    match e {
        PortError::Unexpected(message) => PortError::MalformedResponse(message),
        PortError::Unauthorized => {
            PortError::MalformedResponse("payments provider rejected our credentials".to_string())
        }
        other => other,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/checkout_session - Open a hosted checkout session
#[utoipa::path(
    post,
    path = "/api/checkout_session",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutSessionResponse),
        (status = 400, description = "Unknown plan", body = ErrorResponse),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 502, description = "Payments provider failed", body = ErrorResponse),
        (status = 503, description = "Payments are not configured", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn create_checkout_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<UserId>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSessionResponse>, HandlerError> {
    let plan = Plan::parse(&req.plan)
        .map_err(|e| port_rejection(e, "Invalid plan"))?;
    let payments = payments(&app_state)?;

    let session = payments
        .create_checkout_session(plan)
        .await
        .map_err(|e| port_rejection(upstream(e), "Failed to create checkout session"))?;

    info!("User {} opened checkout session {}", user_id, session.id);
    Ok(Json(CheckoutSessionResponse {
        id: session.id,
        url: session.url,
    }))
}

/// GET /api/checkout_session?session_id= - Report a checkout session's payment status
#[utoipa::path(
    get,
    path = "/api/checkout_session",
    responses(
        (status = 200, description = "Checkout session status", body = CheckoutStatusResponse),
        (status = 400, description = "Missing session id", body = ErrorResponse),
        (status = 401, description = "Missing user id", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 502, description = "Payments provider failed", body = ErrorResponse),
        (status = 503, description = "Payments are not configured", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Query, description = "The checkout session id."),
        ("x-user-id" = String, Header, description = "The caller's user id.")
    )
)]
pub async fn checkout_status_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CheckoutQuery>,
) -> Result<Json<CheckoutStatusResponse>, HandlerError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "session_id is required"))?;
    let payments = payments(&app_state)?;

    let status = payments
        .get_checkout_session(&session_id)
        .await
        .map_err(|e| port_rejection(upstream(e), "Failed to retrieve checkout session"))?;

    Ok(Json(CheckoutStatusResponse {
        id: status.id,
        payment_status: status.payment_status,
    }))
}
