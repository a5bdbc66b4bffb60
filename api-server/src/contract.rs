//! Response contracts
//!
//! The service speaks one of two wire contracts, picked by the configured
//! feature schema. They differ in request shape, label vocabulary, error
//! body and in how a classifier failure is classified, and are kept apart
//! on purpose: clients of one never see the other's shapes.

use axum::http::StatusCode;
use serde_json::{json, Value};

use phishguard_core::features::{FeatureSchema, RequestShape};
use phishguard_core::model::{Label, LabelVocabulary};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseContract {
    /// Named URL fields in, `{status: "phishing"|"legitimate"}` out
    UrlFeatures,
    /// `{features: [...]}` in, `{status: "success", prediction, result}` out
    WebsiteFeatures,
}

impl ResponseContract {
    pub fn for_schema(schema: &FeatureSchema) -> Self {
        match schema.shape {
            RequestShape::NamedFields => ResponseContract::UrlFeatures,
            RequestShape::OrderedList => ResponseContract::WebsiteFeatures,
        }
    }

    pub fn vocabulary(self) -> LabelVocabulary {
        match self {
            ResponseContract::UrlFeatures => LabelVocabulary::Lowercase,
            ResponseContract::WebsiteFeatures => LabelVocabulary::Capitalized,
        }
    }

    /// Success body for a predicted label
    pub fn success(self, label: Label) -> Value {
        let name = self.vocabulary().name(label);
        match self {
            ResponseContract::UrlFeatures => json!({ "status": name }),
            ResponseContract::WebsiteFeatures => json!({
                "status": "success",
                "prediction": label.binary(),
                "result": name,
            }),
        }
    }

    pub fn status_for(self, error: &AppError) -> StatusCode {
        match (self, error) {
            (_, AppError::ModelUnavailable) => StatusCode::INTERNAL_SERVER_ERROR,
            (_, AppError::MalformedRequest(_)) => StatusCode::BAD_REQUEST,
            (_, AppError::FeatureShapeMismatch { .. }) => StatusCode::BAD_REQUEST,
            (ResponseContract::UrlFeatures, AppError::PredictionFailure(_)) => StatusCode::BAD_REQUEST,
            (ResponseContract::WebsiteFeatures, AppError::PredictionFailure(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message for an error
    pub fn message_for(self, error: &AppError) -> String {
        match self {
            ResponseContract::UrlFeatures => match error {
                AppError::ModelUnavailable => "Model not available".to_string(),
                AppError::FeatureShapeMismatch { expected, received } => format!(
                    "An error occurred during prediction: Feature shape mismatch, expected: {}, got {}",
                    expected, received
                ),
                AppError::MalformedRequest(detail) | AppError::PredictionFailure(detail) => {
                    format!("An error occurred: {}", detail)
                }
            },
            ResponseContract::WebsiteFeatures => match error {
                AppError::ModelUnavailable => "Model not loaded".to_string(),
                AppError::FeatureShapeMismatch { expected, received } => {
                    format!("Expected {} features, got {}", expected, received)
                }
                AppError::MalformedRequest(detail) | AppError::PredictionFailure(detail) => {
                    detail.clone()
                }
            },
        }
    }

    /// Status code and body for an error
    pub fn error_response(self, error: &AppError) -> (StatusCode, Value) {
        let message = self.message_for(error);
        let body = match self {
            ResponseContract::UrlFeatures => json!({ "error": message }),
            ResponseContract::WebsiteFeatures => json!({ "status": "error", "message": message }),
        };
        (self.status_for(error), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_from_schema() {
        assert_eq!(
            ResponseContract::for_schema(&FeatureSchema::url_features()),
            ResponseContract::UrlFeatures
        );
        assert_eq!(
            ResponseContract::for_schema(&FeatureSchema::website_features()),
            ResponseContract::WebsiteFeatures
        );
    }

    #[test]
    fn test_success_bodies() {
        assert_eq!(
            ResponseContract::UrlFeatures.success(Label::Phishing),
            json!({"status": "phishing"})
        );
        assert_eq!(
            ResponseContract::WebsiteFeatures.success(Label::Phishing),
            json!({"status": "success", "prediction": 1, "result": "Phishing"})
        );
        assert_eq!(
            ResponseContract::WebsiteFeatures.success(Label::Legitimate),
            json!({"status": "success", "prediction": 0, "result": "Legitimate"})
        );
    }

    #[test]
    fn test_url_contract_errors() {
        let contract = ResponseContract::UrlFeatures;

        let (status, body) = contract.error_response(&AppError::ModelUnavailable);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Model not available"}));

        let (status, body) = contract.error_response(&AppError::FeatureShapeMismatch {
            expected: 12,
            received: 11,
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "An error occurred during prediction: Feature shape mismatch, expected: 12, got 11"
        );

        let (status, body) = contract.error_response(&AppError::PredictionFailure("boom".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "An error occurred: boom");
    }

    #[test]
    fn test_website_contract_errors() {
        let contract = ResponseContract::WebsiteFeatures;

        let (status, body) = contract.error_response(&AppError::ModelUnavailable);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"status": "error", "message": "Model not loaded"}));

        let (status, body) = contract.error_response(&AppError::FeatureShapeMismatch {
            expected: 30,
            received: 3,
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"status": "error", "message": "Expected 30 features, got 3"}));

        let (status, body) = contract.error_response(&AppError::PredictionFailure("boom".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "boom");

        let (status, _) = contract.error_response(&AppError::MalformedRequest("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
