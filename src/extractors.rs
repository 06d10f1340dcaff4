use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::AppError;

/// Request body parsed as JSON regardless of the Content-Type header.
/// Shape checks happen later in [`crate::validation`].
pub struct JsonPayload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::MalformedJson(e.body_text()))?;
        let value = serde_json::from_slice(&body).map_err(|e| AppError::MalformedJson(e.to_string()))?;
        Ok(JsonPayload(value))
    }
}
