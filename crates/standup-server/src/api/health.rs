use axum::{routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct PingResponse {
    status: &'static str,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Keep-alive probe for hosts that idle inactive services
async fn ping() -> Json<PingResponse> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    tracing::info!("[PING] Hit at {}", timestamp);
    Json(PingResponse {
        status: "pong",
        timestamp,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
}
