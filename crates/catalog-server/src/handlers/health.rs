//! Liveness check

use crate::AppState;
use axum::{extract::State, Json};
use catalog_core::ApiResponse;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    timestamp: String,
    backend: String,
    clients: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(
        ApiResponse::ok(HealthStatus {
            timestamp: Utc::now().to_rfc3339(),
            backend: state.store.backend().to_string(),
            clients: state.broadcaster.client_count(),
        })
        .with_message("API running"),
    )
}
