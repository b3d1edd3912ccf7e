//! services/api/src/error.rs
//!
//! Startup failures of the flashcards service. Request-time failures never
//! reach this type; handlers answer them with an `ErrorResponse`.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting the Postgres document store failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding or serving the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting that is present but unusable, such as a missing OpenAI key
    /// or a CORS origin the router cannot serve.
    #[error("Startup error: {0}")]
    Internal(String),
}
