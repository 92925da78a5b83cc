//! Crowlands API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crowlands_api::config::Config;
use crowlands_api::error::AppError;
use crowlands_api::routes;
use crowlands_api::state::AppState;
use crowlands_core::clock::SystemClock;
use crowlands_core::retry::RetryPolicy;
use crowlands_entitlement::{EntitlementLedger, PgEntitlementStore, QuotaPolicy};
use crowlands_generation::GenerationOrchestrator;
use crowlands_generation::openai::{OpenAiImageProvider, OpenAiTextProvider, ProviderConfig};
use crowlands_grimoire::PgSpellStore;
use crowlands_payment::{PaymentConfirmationWorker, PgPaymentSessionStore, StripeGateway};
use crowlands_persona::PersonaRegistry;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Delay schedule for payment confirmation, mirroring the client's own
/// five-attempt poll.
const CONFIRMATION_POLICY_ATTEMPTS: u32 = 5;
const CONFIRMATION_POLICY_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Crowlands API server");

    let config = Config::from_env()?;

    // Persona catalog: file override or the embedded default.
    let registry = Arc::new(match &config.persona_catalog {
        Some(path) => PersonaRegistry::from_path(path)?,
        None => PersonaRegistry::builtin()?,
    });
    tracing::info!(personas = registry.list().len(), "persona catalog loaded");

    // Database pool and migrations.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let clock = Arc::new(SystemClock);

    let ledger = EntitlementLedger::new(
        Arc::new(PgEntitlementStore::new(pool.clone())),
        QuotaPolicy {
            monthly_limit: config.free_tier_quota,
        },
    );

    let provider_config = ProviderConfig {
        base_url: config.llm_base_url.clone(),
        api_key: config.llm_api_key.clone(),
    };
    let text_provider = OpenAiTextProvider::new(provider_config.clone(), &config.llm_model)
        .map_err(|e| AppError::Config(e.to_string()))?;
    let image_provider = OpenAiImageProvider::new(provider_config, &config.image_model)
        .map_err(|e| AppError::Config(e.to_string()))?;

    let orchestrator = Arc::new(GenerationOrchestrator::new(
        Arc::clone(&registry),
        ledger.clone(),
        Arc::new(text_provider),
        Arc::new(image_provider),
        clock.clone(),
    ));

    let gateway = StripeGateway::new(config.stripe_secret_key.clone(), config.stripe_price_cents)
        .map_err(|e| AppError::Config(e.to_string()))?;
    let payments = Arc::new(PaymentConfirmationWorker::new(
        Arc::new(PgPaymentSessionStore::new(pool.clone())),
        Arc::new(gateway),
        ledger.clone(),
        RetryPolicy::fixed(CONFIRMATION_POLICY_ATTEMPTS, CONFIRMATION_POLICY_DELAY),
        clock.clone(),
    ));

    let app_state = AppState::new(
        registry,
        ledger,
        orchestrator,
        payments,
        Arc::new(PgSpellStore::new(pool)),
        clock,
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
