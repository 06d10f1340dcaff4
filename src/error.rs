use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{db::StoreError, validation::ValidationError};

/// Every way a request can fail. Rendered as `{"error": code, "message": detail}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("item id must be a non-negative integer")]
    InvalidItemId,
    #[error("a category with this name already exists")]
    DuplicateCategory,
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("category_id does not reference an existing category")]
    UnknownCategory,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("item not found")]
    ItemNotFound,
    #[error("no route for this method and path")]
    RouteNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedJson(_)
            | AppError::Validation(_)
            | AppError::InvalidItemId
            | AppError::DuplicateCategory
            | AppError::DuplicateUsername
            | AppError::UnknownCategory
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ItemNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedJson(_) => "invalid_json",
            AppError::Validation(v) => v.code(),
            AppError::InvalidItemId => "invalid_item_id",
            AppError::DuplicateCategory => "duplicate_category",
            AppError::DuplicateUsername => "duplicate_username",
            AppError::UnknownCategory => "foreign_key_violation",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::ItemNotFound => "item_not_found",
            AppError::RouteNotFound => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        (
            status,
            Json(json!({
                "error": self.code(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// Constraint violations that reach this conversion were not expected by the
/// caller; handlers match the ones they understand before using `?`.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Catch-all for unknown paths and unsupported methods.
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}
