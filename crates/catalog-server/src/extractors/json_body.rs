//! JSON body extractor that reports problems in the response envelope
//!
//! Unlike `axum::Json`, a missing body or content type is not an error: an
//! empty (or `null`) body reads as `{}`, so "required field missing" is
//! decided by the service with a proper message.

use crate::handlers::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use bytes::Bytes;
use catalog_core::CatalogError;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            CatalogError::validation(format!("Failed to read request body: {}", e))
        })?;
        parse_body(&body).map(JsonBody)
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)
            .map_err(|e| CatalogError::validation(format!("Invalid JSON body: {}", e)))?
    };
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| CatalogError::validation(format!("Invalid request payload: {}", e)).into())
}
