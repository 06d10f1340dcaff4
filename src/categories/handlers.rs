use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{repo, repo_types::Category};
use crate::{
    auth::AuthUser,
    db::StoreError,
    dto::{created, CreatedResponse},
    error::{not_found, AppError},
    extractors::JsonPayload,
    state::AppState,
    validation,
};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/categories",
        get(list_categories)
            .post(create_category)
            .fallback(not_found),
    )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = repo::list(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, HeaderMap, Json<CreatedResponse>), AppError> {
    let new = validation::new_category(&body)?;

    let category = match repo::create(&state.db, &new.name).await {
        Ok(c) => c,
        Err(StoreError::Duplicate) => {
            warn!(name = %new.name, "duplicate category");
            return Err(AppError::DuplicateCategory);
        }
        Err(e) => return Err(e.into()),
    };

    info!(category_id = category.id, name = %category.name, %username, "category created");
    Ok(created(None, category.id, "Category created successfully"))
}
