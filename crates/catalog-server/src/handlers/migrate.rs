//! Migration handler

use crate::handlers::ApiResult;
use crate::services::MigrationReport;
use crate::AppState;
use axum::{extract::State, Json};
use catalog_core::ApiResponse;

pub async fn migrate(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<MigrationReport>>> {
    let report = state.migrator.migrate().await?;
    Ok(Json(ApiResponse::ok(report).with_message("Migration completed")))
}
