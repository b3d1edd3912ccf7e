//! services/api/src/client.rs
//!
//! A typed client for this service's HTTP API. It plugs the server's
//! generation and checkout endpoints into the core ports, so the page
//! view-models can run against a live deployment.

use async_trait::async_trait;
use flashcards_core::{
    domain::{Card, CheckoutSession, CheckoutStatus, Plan, UserId},
    generation::{decode_cards, GenerationOutcome},
    ports::{FlashcardGenerator, PaymentService, PortError, PortResult},
};
use reqwest::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::web::USER_ID_HEADER;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: Option<UserId>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
        }
    }

    /// Sends `user_id` as the caller's identity on every request.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.user_id {
            Some(user) => builder.header(USER_ID_HEADER, user.as_str()),
            None => builder,
        }
    }

    /// Calls `POST /api/generate` and decodes the body.
    ///
    /// Only a successful response whose body is an array of cards counts as
    /// `Cards`; every other answer is `Malformed`.
    pub async fn generate_outcome(&self, text: &str) -> PortResult<GenerationOutcome> {
        let response = self
            .request(reqwest::Method::POST, "/api/generate")
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !status.is_success() {
            warn!("Generation endpoint answered {}: {}", status, body);
            return Ok(GenerationOutcome::Malformed(format!("status {}", status)));
        }
        Ok(decode_cards(&body))
    }
}

fn status_error(status: StatusCode, body: &str) -> PortError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("request failed with {}", status));
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::BAD_REQUEST => PortError::InvalidInput(message),
        StatusCode::CONFLICT => PortError::Conflict(message),
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        _ => PortError::Unexpected(message),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| PortError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl FlashcardGenerator for ApiClient {
    async fn generate(&self, text: &str) -> PortResult<Vec<Card>> {
        self.generate_outcome(text).await?.into_result()
    }
}

#[async_trait]
impl PaymentService for ApiClient {
    async fn create_checkout_session(&self, plan: Plan) -> PortResult<CheckoutSession> {
        let response = self
            .request(reqwest::Method::POST, "/api/checkout_session")
            .json(&json!({ "plan": plan }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        read_json(response).await
    }

    async fn get_checkout_session(&self, session_id: &str) -> PortResult<CheckoutStatus> {
        let response = self
            .request(reqwest::Method::GET, "/api/checkout_session")
            .query(&[("session_id", session_id)])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        read_json(response).await
    }
}
