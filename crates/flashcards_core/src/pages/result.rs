//! The `/result?session_id=<id>` page shown after returning from checkout.

use std::sync::Arc;

use tracing::error;

use crate::ports::{PaymentService, PortError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState {
    Loading,
    Failed(String),
    Paid { session_id: String },
    Unpaid,
}

pub struct ResultPage {
    payments: Arc<dyn PaymentService>,
    session_id: Option<String>,
    state: ResultState,
}

impl ResultPage {
    pub fn new(payments: Arc<dyn PaymentService>, session_id: Option<String>) -> Self {
        Self {
            payments,
            session_id,
            state: ResultState::Loading,
        }
    }

    pub fn state(&self) -> &ResultState {
        &self.state
    }

    /// Fetches the checkout outcome. Without a session id the page stays loading.
    pub async fn load(&mut self) {
        let Some(session_id) = self.session_id.as_deref() else {
            return;
        };
        self.state = match self.payments.get_checkout_session(session_id).await {
            Ok(status) if status.is_paid() => ResultState::Paid {
                session_id: status.id,
            },
            Ok(_) => ResultState::Unpaid,
            Err(PortError::NotFound(message)) | Err(PortError::InvalidInput(message)) => {
                ResultState::Failed(message)
            }
            Err(e) => {
                error!("Failed to fetch checkout session {}: {:?}", session_id, e);
                ResultState::Failed("An error occurred".to_string())
            }
        };
    }
}
