//! services/api/src/adapters/stripe.rs
//!
//! This module contains the payments adapter. It implements the `PaymentService`
//! port by talking to the Stripe Checkout REST API with `reqwest`.

use async_trait::async_trait;
use flashcards_core::{
    domain::{CheckoutSession, CheckoutStatus, Plan},
    ports::{PaymentService, PortError, PortResult},
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{error, info};

//=========================================================================================
// Stripe Wire Types
//=========================================================================================

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PaymentService` against Stripe Checkout.
#[derive(Clone)]
pub struct StripeAdapter {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
    public_base_url: String,
}

impl StripeAdapter {
    /// Creates a new `StripeAdapter`.
    ///
    /// `public_base_url` is where the browser lands after checkout.
    pub fn new(
        http: reqwest::Client,
        secret_key: String,
        api_base: String,
        public_base_url: String,
    ) -> Self {
        Self {
            http,
            secret_key,
            api_base,
            public_base_url,
        }
    }

    /// The `application/x-www-form-urlencoded` body for a monthly subscription.
    fn checkout_form(&self, plan: Plan) -> Vec<(&'static str, String)> {
        let return_url = format!(
            "{}/result?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url
        );
        vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[]", "card".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                plan.product_name().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                plan.unit_amount_cents().to_string(),
            ),
            ("line_items[0][price_data][recurring][interval]", "month".to_string()),
            ("line_items[0][price_data][recurring][interval_count]", "1".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", return_url.clone()),
            ("cancel_url", return_url),
        ]
    }

    async fn read_session(&self, response: reqwest::Response) -> PortResult<StripeSession> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<StripeSession>()
                .await
                .map_err(|e| PortError::MalformedResponse(e.to_string()));
        }

        let message = response
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| format!("Stripe responded with {}", status));
        error!("Stripe request failed ({}): {}", status, message);
        Err(match status {
            StatusCode::NOT_FOUND => PortError::NotFound(message),
            StatusCode::BAD_REQUEST => PortError::InvalidInput(message),
            StatusCode::UNAUTHORIZED => PortError::Unauthorized,
            _ => PortError::Unexpected(message),
        })
    }
}

//=========================================================================================
// `PaymentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PaymentService for StripeAdapter {
    async fn create_checkout_session(&self, plan: Plan) -> PortResult<CheckoutSession> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.checkout_form(plan))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let session = self.read_session(response).await?;
        info!("Created checkout session {} for {:?}", session.id, plan);
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn get_checkout_session(&self, session_id: &str) -> PortResult<CheckoutStatus> {
        let session_id = validate_session_id(session_id)?;
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let session = self.read_session(response).await?;
        Ok(CheckoutStatus {
            id: session.id,
            payment_status: session.payment_status.unwrap_or_else(|| "unpaid".to_string()),
        })
    }
}

/// Session ids go into a path segment, so only `[A-Za-z0-9_]` is accepted.
fn validate_session_id(raw: &str) -> PortResult<&str> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PortError::InvalidInput(format!(
            "Invalid checkout session id '{}'",
            raw
        )));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> StripeAdapter {
        StripeAdapter::new(
            reqwest::Client::new(),
            "sk_test".into(),
            "https://api.stripe.com".into(),
            "https://cards.example".into(),
        )
    }

    #[test]
    fn form_describes_monthly_subscription() {
        let form = adapter().checkout_form(Plan::Pro);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("mode"), Some("subscription"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Pro subscription")
        );
        assert_eq!(
            get("success_url"),
            Some("https://cards.example/result?session_id={CHECKOUT_SESSION_ID}")
        );
    }

    #[test]
    fn session_ids_outside_the_alphabet_are_rejected() {
        assert_eq!(validate_session_id("cs_test_a1").unwrap(), "cs_test_a1");
        assert!(matches!(
            validate_session_id("cs_test_a1/../b"),
            Err(PortError::InvalidInput(_))
        ));
        assert!(matches!(validate_session_id(""), Err(PortError::InvalidInput(_))));
    }
}
