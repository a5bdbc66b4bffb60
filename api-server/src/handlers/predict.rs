//! Prediction handlers
//!
//! Flow: model available → body parsed → schema validated → classifier
//! called → label rendered through the active contract.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use phishguard_core::features::url::website_vector;
use phishguard_core::features::validate::{check_shape, parse_body};
use phishguard_core::features::{validate_request, FeatureVector, ValidationError};
use phishguard_core::model::{Classifier, Label};

use crate::contract::ResponseContract;
use crate::error::{ApiError, AppError, AppResult};
use crate::AppState;

/// Key holding the URL for `/predict_url`
pub const URL_KEY: &str = "url";

fn classifier(state: &AppState) -> AppResult<&dyn Classifier> {
    state
        .model
        .classifier()
        .map(|c| c.as_ref())
        .ok_or(AppError::ModelUnavailable)
}

fn classify(state: &AppState, model: &dyn Classifier, vector: &FeatureVector) -> AppResult<Label> {
    tracing::trace!("Features: {}", vector.to_log_entry(&state.schema));
    let label = model.predict(vector.as_slice())?;
    tracing::debug!("Classified {} features as {:?}", vector.len(), label);
    Ok(label)
}

fn predict_features(state: &AppState, body: &[u8]) -> AppResult<Label> {
    let model = classifier(state)?;
    let body = parse_body(body)?;
    let vector = validate_request(&state.schema, model.feature_count(), &body)?;
    classify(state, model, &vector)
}

fn predict_from_url(state: &AppState, body: &[u8]) -> AppResult<Label> {
    if state.contract != ResponseContract::WebsiteFeatures {
        return Err(AppError::MalformedRequest(
            "URL prediction requires the website_features schema".to_string(),
        ));
    }

    let model = classifier(state)?;
    let body = parse_body(body)?;
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;
    let url = object
        .get(URL_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::MissingField(URL_KEY.to_string()))?;

    let vector = website_vector(url)?;
    check_shape(model.feature_count(), vector.len())?;
    classify(state, model, &vector)
}

/// `POST /predict`
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let label = predict_features(&state, &body).map_err(|e| e.with_contract(state.contract))?;
    Ok(Json(state.contract.success(label)))
}

/// `POST /predict_url`
pub async fn predict_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let label = predict_from_url(&state, &body).map_err(|e| e.with_contract(state.contract))?;
    Ok(Json(state.contract.success(label)))
}
