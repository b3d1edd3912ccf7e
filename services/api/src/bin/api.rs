//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiFlashcardAdapter, StripeAdapter},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use flashcards_core::{
    memory::MemoryDocumentStore,
    ports::{DocumentStore, PaymentService},
    repository::CollectionRepository,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Document Store & Run Migrations ---
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; collections are kept in memory and lost on restart.");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let generator = Arc::new(OpenAiFlashcardAdapter::new(
        openai_client,
        config.generation_model.clone(),
        config.max_cards,
    ));

    let payments: Option<Arc<dyn PaymentService>> = match &config.stripe_secret_key {
        Some(secret_key) => Some(Arc::new(StripeAdapter::new(
            reqwest::Client::new(),
            secret_key.clone(),
            config.stripe_api_base.clone(),
            config.public_base_url.clone(),
        ))),
        None => {
            warn!("STRIPE_SECRET_KEY is not set; checkout routes will answer 503.");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        repository: CollectionRepository::new(store),
        generator,
        payments,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
