//! Sheet handlers

use crate::extractors::JsonBody;
use crate::handlers::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use catalog_core::{ApiResponse, CategoryLinks, NewSheet, Sheet, SheetPatch};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Sheet>>>> {
    let sheets = state.sheets.list().await?;
    Ok(Json(ApiResponse::list(sheets)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Sheet>>> {
    let sheet = state.sheets.get(id).await?;
    Ok(Json(ApiResponse::ok(sheet)))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewSheet>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Sheet>>)> {
    let sheet = state.sheets.create(new).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(sheet).with_message("Sheet created successfully")),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<SheetPatch>,
) -> ApiResult<Json<ApiResponse<Sheet>>> {
    let sheet = state.sheets.update(id, patch).await?;
    Ok(Json(
        ApiResponse::ok(sheet).with_message("Sheet updated successfully"),
    ))
}

pub async fn set_categories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(links): JsonBody<CategoryLinks>,
) -> ApiResult<Json<ApiResponse<Sheet>>> {
    let sheet = state.sheets.set_categories(id, links).await?;
    Ok(Json(
        ApiResponse::ok(sheet).with_message("Sheet categories updated"),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Sheet>>> {
    let removed = state.sheets.delete(id).await?;
    Ok(Json(
        ApiResponse::ok(removed).with_message("Sheet deleted successfully"),
    ))
}

pub async fn delete_all(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<()>>> {
    state.sheets.delete_all().await?;
    Ok(Json(ApiResponse::message("All sheets were deleted")))
}
