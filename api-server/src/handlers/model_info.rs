//! Model introspection handler

use axum::{extract::State, Json};
use serde::Serialize;

use phishguard_core::features::layout::LayoutInfo;
use phishguard_core::model::{ModelHandle, ModelStatus};

use crate::AppState;

/// Loader status. Always answered, whether or not the model loaded.
#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_status: ModelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_expected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub schema: LayoutInfo,
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let (features_expected, message) = match &state.model {
        ModelHandle::Loaded(classifier) => (Some(classifier.feature_count()), None),
        ModelHandle::Unavailable { .. } => (None, Some("Model could not be loaded.")),
    };

    Json(ModelInfoResponse {
        model_status: state.model.status(),
        features_expected,
        message,
        schema: state.schema.info(),
    })
}
