//! Mapping of catalog errors onto the response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::{ApiResponse, CatalogError};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error response: status from the error kind, `{success: false, message}` body
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CatalogError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::failure(self.0.to_string()))).into_response()
    }
}
