//! Category handlers

use crate::extractors::JsonBody;
use crate::handlers::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use catalog_core::{ApiResponse, Category, CategoryPatch, NewCategory};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.categories.list().await?;
    Ok(Json(ApiResponse::list(categories)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let category = state.categories.get(id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewCategory>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.categories.create(new).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(category).with_message("Category created successfully")),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<CategoryPatch>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let category = state.categories.update(id, patch).await?;
    Ok(Json(
        ApiResponse::ok(category).with_message("Category updated successfully"),
    ))
}

/// Also deletes every sheet filed under the category
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let removed = state.categories.delete(id).await?;
    Ok(Json(
        ApiResponse::ok(removed).with_message("Category deleted successfully"),
    ))
}

pub async fn delete_all(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<()>>> {
    state.categories.delete_all().await?;
    Ok(Json(ApiResponse::message("All categories were deleted")))
}
