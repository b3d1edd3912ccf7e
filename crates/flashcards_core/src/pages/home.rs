//! The landing page: pricing tiers and the checkout redirect.

use std::sync::Arc;

use tracing::error;

use crate::domain::Plan;
use crate::pages::Notification;
use crate::ports::PaymentService;

pub struct HomePage {
    payments: Arc<dyn PaymentService>,
    pub notification: Notification,
}

impl HomePage {
    pub fn new(payments: Arc<dyn PaymentService>) -> Self {
        Self {
            payments,
            notification: Notification::default(),
        }
    }

    /// Opens a checkout session and returns the hosted page to redirect to.
    pub async fn subscribe(&mut self, plan: Plan) -> Option<String> {
        match self.payments.create_checkout_session(plan).await {
            Ok(session) => {
                if session.url.is_none() {
                    self.notification
                        .show("Checkout is unavailable right now. Please try again.");
                }
                session.url
            }
            Err(e) => {
                error!("Failed to create checkout session: {:?}", e);
                self.notification
                    .show("Checkout is unavailable right now. Please try again.");
                None
            }
        }
    }
}
