//! PhishGuard API Server
//!
//! Loads the model artifact once, then serves predictions under the
//! configured feature schema. A missing or broken artifact does not stop
//! the server: predictions fail fast and `/model_info` reports the error.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard_api::{config::Config, create_router, AppState};
use phishguard_core::features::FeatureSchema;
use phishguard_core::model::loader::{check_schema, load_model};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging (JSON lines in production)
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard_api=debug,phishguard_core=info,tower_http=debug".into()));
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("PhishGuard API starting ({})...", config.environment);

    let schema = FeatureSchema::by_name(&config.feature_schema)?;
    tracing::info!(
        "Feature schema: {} v{} ({} features)",
        schema.name,
        schema.version,
        schema.feature_count()
    );

    let model = load_model(&config.model_path);
    if !check_schema(&model, &schema) {
        tracing::warn!("Model and feature schema '{}' disagree", schema.name);
    }

    // Build router
    let app = create_router(AppState::new(model, schema));

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
