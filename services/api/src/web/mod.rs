pub mod checkout;
pub mod generate;
pub mod middleware;
pub mod rest;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware as axum_middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use flashcards_core::ports::PortError;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use state::AppState;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use checkout::{checkout_status_handler, create_checkout_handler};
pub use generate::generate_handler;
pub use middleware::require_user;
pub use rest::{
    delete_collection_handler, get_collection_handler, list_collections_handler,
    save_collection_handler, ApiDoc,
};

/// Header carrying the caller's identity, set by the upstream identity provider.
pub const USER_ID_HEADER: &str = "x-user-id";

//=========================================================================================
// Error Responses
//=========================================================================================

/// The body of every non-2xx answer. Never an array, so clients cannot
/// mistake it for a card list.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn reject(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Maps a port error to a response. Validation messages are passed through;
/// anything else is logged and answered with `fallback`.
pub fn port_rejection(e: PortError, fallback: &str) -> HandlerError {
    match e {
        PortError::InvalidInput(message) => reject(StatusCode::BAD_REQUEST, message),
        PortError::Conflict(message) => reject(StatusCode::CONFLICT, message),
        PortError::NotFound(message) => reject(StatusCode::NOT_FOUND, message),
        PortError::Unauthorized => reject(StatusCode::UNAUTHORIZED, "Please sign in."),
        PortError::MalformedResponse(_) => {
            error!("{}: {:?}", fallback, e);
            reject(StatusCode::BAD_GATEWAY, fallback)
        }
        PortError::Unexpected(_) => {
            error!("{}: {:?}", fallback, e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the complete application: the protected API plus the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let cors_origin = app_state.config.cors_origin.trim();
    if cors_origin == "*" {
        return Err(ApiError::Internal(
            "CORS_ORIGIN '*' cannot be used with credentials".to_string(),
        ));
    }
    let origin = cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static(USER_ID_HEADER)]);

    // Every API route needs a signed-in user.
    let api_router = Router::new()
        .route("/api/generate", post(generate_handler))
        .route(
            "/api/collections",
            get(list_collections_handler).post(save_collection_handler),
        )
        .route(
            "/api/collections/{name}",
            get(get_collection_handler).delete(delete_collection_handler),
        )
        .route(
            "/api/checkout_session",
            post(create_checkout_handler).get(checkout_status_handler),
        )
        .layer(axum_middleware::from_fn(require_user))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
