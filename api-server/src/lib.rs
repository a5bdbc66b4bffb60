//! PhishGuard prediction service
//!
//! Stateless HTTP front end over a classifier loaded once at startup.
//!
//! # Routes
//!
//! ```text
//! GET  /             liveness text
//! GET  /ping         {"status":"ok"}
//! GET  /model_info   loader status and serving schema
//! POST /predict      feature payload per the active contract
//! POST /predict_url  {"url": ...}, website_features contract only
//! ```

pub mod config;
pub mod contract;
pub mod error;
pub mod handlers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use phishguard_core::features::FeatureSchema;
use phishguard_core::model::ModelHandle;

pub use contract::ResponseContract;
pub use error::{ApiError, AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub contract: ResponseContract,
    pub schema: Arc<FeatureSchema>,
}

impl AppState {
    /// State serving `schema` with the contract it implies
    pub fn new(model: ModelHandle, schema: FeatureSchema) -> Self {
        Self {
            model,
            contract: ResponseContract::for_schema(&schema),
            schema: Arc::new(schema),
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/ping", get(handlers::health::ping))
        .route("/model_info", get(handlers::model_info::model_info))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_url", post(handlers::predict::predict_url))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
