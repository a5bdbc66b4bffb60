//! Router tests against in-memory classifiers

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use phishguard_core::features::FeatureSchema;
use phishguard_core::model::{Classifier, Label, ModelError, ModelHandle};

use crate::{create_router, AppState};

/// Phishing when the first feature is positive
struct FirstFeature(usize);

impl Classifier for FirstFeature {
    fn name(&self) -> &str {
        "first_feature"
    }

    fn feature_count(&self) -> usize {
        self.0
    }

    fn predict(&self, features: &[f64]) -> Result<Label, ModelError> {
        phishguard_core::model::classifier::check_input(self.0, features)?;
        Ok(if features[0] > 0.0 { Label::Phishing } else { Label::Legitimate })
    }
}

/// Accepts the shape, then fails
struct Broken(usize);

impl Classifier for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn feature_count(&self) -> usize {
        self.0
    }

    fn predict(&self, _features: &[f64]) -> Result<Label, ModelError> {
        Err(ModelError::InvalidInput("tree 3 has no root".to_string()))
    }
}

fn website_app(model: ModelHandle) -> Router {
    create_router(AppState::new(model, FeatureSchema::website_features()))
}

fn url_app(model: ModelHandle) -> Router {
    create_router(AppState::new(model, FeatureSchema::url_features()))
}

fn url_body(url_length: i64) -> Value {
    json!({
        "url_length": url_length, "hostname_length": 12, "dot_count": 2,
        "slash_count": 3, "has_ip": 0, "has_special_chars": 0,
        "subdomain_count": 1, "has_https": 1, "has_sensitive_words": 0,
        "directory_count": 1, "query_param_count": 0, "is_shortened": 0,
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post(app, uri, body.to_string()).await
}

// ============================================================================
// Liveness and introspection
// ============================================================================

#[tokio::test]
async fn test_home() {
    let (status, body) = get(website_app(ModelHandle::unavailable("missing")), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Phishing Detector API is running!");
}

#[tokio::test]
async fn test_ping() {
    let (status, body) = get(url_app(ModelHandle::unavailable("missing")), "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_model_info_loaded() {
    let (status, body) = get(website_app(ModelHandle::loaded(FirstFeature(30))), "/model_info").await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_status"], "loaded");
    assert_eq!(body["features_expected"], 30);
    assert!(body.get("message").is_none());
    assert_eq!(body["schema"]["name"], "website_features");
}

#[tokio::test]
async fn test_model_info_unavailable() {
    let (status, body) = get(url_app(ModelHandle::unavailable("missing")), "/model_info").await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_status"], "error");
    assert_eq!(body["message"], "Model could not be loaded.");
    assert!(body.get("features_expected").is_none());
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let request = Request::builder()
        .uri("/ping")
        .header(header::ORIGIN, "chrome-extension://abcdef")
        .body(Body::empty())
        .unwrap();
    let response = website_app(ModelHandle::unavailable("missing"))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

// ============================================================================
// website_features contract
// ============================================================================

#[tokio::test]
async fn test_website_predict_success() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));

    let mut features = vec![-1; 30];
    features[0] = 1;
    let (status, body) = post_json(app.clone(), "/predict", json!({ "features": features })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "prediction": 1, "result": "Phishing"}));

    let (status, body) = post_json(app, "/predict", json!({ "features": vec![-1; 30] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "prediction": 0, "result": "Legitimate"}));
}

#[tokio::test]
async fn test_website_predict_is_repeatable() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let request = json!({ "features": vec![1; 30] });

    let (_, first) = post_json(app.clone(), "/predict", request.clone()).await;
    let (_, second) = post_json(app, "/predict", request).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_website_shape_mismatch() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let (status, body) = post_json(app, "/predict", json!({"features": [1, 0, -1]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"status": "error", "message": "Expected 30 features, got 3"}));
}

#[tokio::test]
async fn test_website_missing_features_key() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let (status, body) = post_json(app, "/predict", json!({"values": [1, 2]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Missing required field: features");
}

#[tokio::test]
async fn test_website_malformed_json() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let (status, body) = post(app, "/predict", "{\"features\": [1, 2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_website_non_numeric_value() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let mut features: Vec<Value> = vec![json!(1); 30];
    features[5] = json!("abc");
    let (status, body) = post_json(app, "/predict", json!({ "features": features })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Prefix_Suffix"));
}

#[tokio::test]
async fn test_website_numeric_strings_accepted() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let mut features: Vec<Value> = vec![json!("-1"); 30];
    features[0] = json!("1");
    let (status, body) = post_json(app, "/predict", json!({ "features": features })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Phishing");
}

#[tokio::test]
async fn test_website_model_unavailable() {
    let app = website_app(ModelHandle::unavailable("missing"));
    let (status, body) = post_json(app, "/predict", json!({ "features": vec![1; 30] })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"status": "error", "message": "Model not loaded"}));
}

#[tokio::test]
async fn test_website_prediction_failure() {
    let app = website_app(ModelHandle::loaded(Broken(30)));
    let (status, body) = post_json(app, "/predict", json!({ "features": vec![1; 30] })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"status": "error", "message": "Invalid input: tree 3 has no root"}));
}

#[tokio::test]
async fn test_content_type_not_enforced() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(json!({ "features": vec![1; 30] }).to_string()))
        .unwrap();
    let (status, _) = send(website_app(ModelHandle::loaded(FirstFeature(30))), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_url() {
    let app = website_app(ModelHandle::loaded(FirstFeature(30)));
    let (status, body) = post_json(
        app.clone(),
        "/predict_url",
        json!({"url": "http://192.168.0.1/paypal/login@verify"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["prediction"] == 0 || body["prediction"] == 1);

    let (status, body) = post_json(app, "/predict_url", json!({"link": "https://example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: url");
}

#[tokio::test]
async fn test_predict_url_model_width_mismatch() {
    let app = website_app(ModelHandle::loaded(FirstFeature(12)));
    let (status, body) = post_json(app, "/predict_url", json!({"url": "https://example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Expected 12 features, got 30");
}

// ============================================================================
// url_features contract
// ============================================================================

#[tokio::test]
async fn test_url_predict_success() {
    let app = url_app(ModelHandle::loaded(FirstFeature(12)));

    let (status, body) = post_json(app.clone(), "/predict", url_body(54)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "phishing"}));

    let (status, body) = post_json(app, "/predict", url_body(0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "legitimate"}));
}

#[tokio::test]
async fn test_url_extra_keys_ignored() {
    let app = url_app(ModelHandle::loaded(FirstFeature(12)));
    let mut body = url_body(54);
    body["referrer"] = json!("newsletter");
    let (status, _) = post_json(app, "/predict", body).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_url_missing_field() {
    let app = url_app(ModelHandle::loaded(FirstFeature(12)));
    let mut body = url_body(54);
    body.as_object_mut().unwrap().remove("is_shortened");
    let (status, body) = post_json(app, "/predict", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "An error occurred: Missing required field: is_shortened"}));
}

#[tokio::test]
async fn test_url_shape_mismatch() {
    let app = url_app(ModelHandle::loaded(FirstFeature(30)));
    let (status, body) = post_json(app, "/predict", url_body(54)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "An error occurred during prediction: Feature shape mismatch, expected: 30, got 12"})
    );
}

#[tokio::test]
async fn test_url_model_unavailable() {
    let app = url_app(ModelHandle::unavailable("missing"));
    let (status, body) = post_json(app, "/predict", url_body(54)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Model not available"}));
}

#[tokio::test]
async fn test_url_prediction_failure_is_client_error() {
    let app = url_app(ModelHandle::loaded(Broken(12)));
    let (status, body) = post_json(app, "/predict", url_body(54)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "An error occurred: Invalid input: tree 3 has no root"}));
}

#[tokio::test]
async fn test_url_contract_rejects_predict_url() {
    let app = url_app(ModelHandle::loaded(FirstFeature(12)));
    let (status, body) = post_json(app, "/predict_url", json!({"url": "https://example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "An error occurred: URL prediction requires the website_features schema"})
    );
}

// ============================================================================
// Trained artifact
// ============================================================================

/// Small url_features forest saved to disk and loaded the way startup does
fn trained_url_model(dir: &std::path::Path) -> ModelHandle {
    use ndarray::Array2;
    use phishguard_core::model::{load_model, ForestParams, ModelArtifact, RandomForest};

    let schema = FeatureSchema::url_features();
    let n = 60;
    let x = Array2::from_shape_fn((n, schema.feature_count()), |(row, col)| {
        let long = row % 2 == 1;
        match col {
            0 => if long { 120.0 + row as f64 } else { 30.0 + (row % 10) as f64 },
            4 | 5 | 8 | 11 => if long { 1.0 } else { 0.0 },
            7 => if long { 0.0 } else { 1.0 },
            // Same across each legitimate/phishing pair
            _ => ((row / 2) % 4) as f64,
        }
    });
    let y: Vec<i64> = (0..n).map(|row| if row % 2 == 1 { 1 } else { -1 }).collect();

    let forest = RandomForest::fit(&x, &y, ForestParams::default().with_trees(10)).unwrap();
    let names = schema.feature_names().into_iter().map(str::to_string).collect();
    let path = dir.join("phishing_model.json");
    ModelArtifact::new(forest, names, None).unwrap().save(&path).unwrap();

    load_model(&path)
}

#[tokio::test]
async fn test_predict_with_trained_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_url_model(dir.path());
    assert!(model.is_loaded());

    let (status, body) = get(url_app(model.clone()), "/model_info").await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features_expected"], 12);

    let (status, body) = post_json(url_app(model.clone()), "/predict", url_body(54)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "legitimate"}));

    let mut phishy = url_body(181);
    for field in ["has_ip", "has_special_chars", "has_sensitive_words", "is_shortened"] {
        phishy[field] = json!(1);
    }
    phishy["has_https"] = json!(0);
    let (status, body) = post_json(url_app(model), "/predict", phishy).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "phishing"}));
}
