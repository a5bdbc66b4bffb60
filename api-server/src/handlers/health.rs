//! Liveness handlers

use axum::Json;
use serde::Serialize;

pub const HOME_MESSAGE: &str = "Phishing Detector API is running!";

#[derive(Serialize)]
pub struct PingResponse {
    status: &'static str,
}

pub async fn home() -> &'static str {
    HOME_MESSAGE
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}
