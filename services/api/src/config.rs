//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory document store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub generation_model: String,
    pub max_cards: usize,
    /// `None` disables the checkout routes.
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub public_base_url: String,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY");
        let stripe_secret_key = lookup("STRIPE_SECRET_KEY").filter(|k| !k.trim().is_empty());

        // --- Load Adapter-specific Settings ---
        let generation_model =
            lookup("GENERATION_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let max_cards_str = lookup("MAX_CARDS").unwrap_or_else(|| "10".to_string());
        let max_cards = match max_cards_str.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "MAX_CARDS".to_string(),
                    format!("'{}' is not a positive integer", max_cards_str),
                ))
            }
        };

        let stripe_api_base = lookup("STRIPE_API_BASE")
            .unwrap_or_else(|| "https://api.stripe.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        // Credentialed CORS needs a concrete origin.
        if cors_origin.trim() == "*" {
            return Err(ConfigError::InvalidValue(
                "CORS_ORIGIN".to_string(),
                "'*' cannot be combined with credentialed requests".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            generation_model,
            max_cards,
            stripe_secret_key,
            stripe_api_base,
            public_base_url,
            cors_origin,
        })
    }
}
