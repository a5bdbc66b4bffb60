//! Error handling

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use phishguard_core::features::url::UrlError;
use phishguard_core::features::ValidationError;
use phishguard_core::model::ModelError;

use crate::contract::ResponseContract;

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures. Rendered per contract; none is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("Model not available")]
    ModelUnavailable,

    #[error("{0}")]
    MalformedRequest(String),

    #[error("Feature shape mismatch, expected: {expected}, got {received}")]
    FeatureShapeMismatch { expected: usize, received: usize },

    #[error("{0}")]
    PredictionFailure(String),
}

impl AppError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, AppError::ModelUnavailable | AppError::PredictionFailure(_))
    }

    /// Bind to the contract that will render it
    pub fn with_contract(self, contract: ResponseContract) -> ApiError {
        ApiError {
            contract,
            error: self,
        }
    }
}

/// An `AppError` paired with the contract that renders it
#[derive(Debug)]
pub struct ApiError {
    pub contract: ResponseContract,
    pub error: AppError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_server_error() {
            tracing::error!("Prediction request failed: {}", self.error);
        } else {
            tracing::debug!("Rejected prediction request: {}", self.error);
        }

        let (status, body) = self.contract.error_response(&self.error);
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ShapeMismatch { expected, received } => {
                AppError::FeatureShapeMismatch { expected, received }
            }
            other => AppError::MalformedRequest(other.to_string()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ShapeMismatch { expected, received } => {
                AppError::FeatureShapeMismatch { expected, received }
            }
            other => AppError::PredictionFailure(other.to_string()),
        }
    }
}

impl From<UrlError> for AppError {
    fn from(err: UrlError) -> Self {
        AppError::MalformedRequest(err.to_string())
    }
}
