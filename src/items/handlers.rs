use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ItemDetails, ItemSummary},
    repo,
};
use crate::{
    auth::AuthUser,
    db::StoreError,
    dto::{created, CreatedResponse, MessageResponse},
    error::{not_found, AppError},
    extractors::JsonPayload,
    state::AppState,
    validation,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(list_items).post(create_item).fallback(not_found),
        )
        // `*rest` never matches an empty tail
        .route("/items/", item_by_id())
        .route("/items/*rest", item_by_id())
}

fn item_by_id() -> MethodRouter<AppState> {
    get(get_item)
        .put(update_item)
        .delete(delete_item)
        .fallback(not_found)
}

/// Everything after `/items/`, undecoded.
fn item_tail(uri: &Uri) -> &str {
    uri.path().strip_prefix("/items/").unwrap_or_default()
}

/// How a path segment reads as an item id.
#[derive(Debug, PartialEq)]
enum IdSegment {
    Id(i64),
    /// All digits, but past any id the store can hold.
    OutOfRange,
    NotNumeric,
}

fn id_segment(segment: &str) -> IdSegment {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return IdSegment::NotNumeric;
    }
    match segment.parse::<i64>() {
        Ok(id) => IdSegment::Id(id),
        Err(_) => IdSegment::OutOfRange,
    }
}

/// Id for a mutating route; anything but a plain integer is a client error.
fn required_id(tail: &str) -> Result<i64, AppError> {
    match id_segment(tail) {
        IdSegment::Id(id) => Ok(id),
        IdSegment::OutOfRange => Err(AppError::ItemNotFound),
        IdSegment::NotNumeric => Err(AppError::InvalidItemId),
    }
}

#[instrument(skip(state))]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<ItemSummary>>, AppError> {
    let items = repo::list(&state.db).await?;
    Ok(Json(items.into_iter().map(ItemSummary::from).collect()))
}

/// `GET /items/<anything>`: a numeric last segment selects one item, any
/// other suffix lists them all.
#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, AppError> {
    let last = item_tail(&uri).rsplit('/').next().unwrap_or_default();
    let id = match id_segment(last) {
        IdSegment::Id(id) => id,
        IdSegment::OutOfRange => return Err(AppError::ItemNotFound),
        IdSegment::NotNumeric => return Ok(list_items(State(state)).await?.into_response()),
    };

    match repo::get(&state.db, id).await? {
        Some(item) => Ok(Json(ItemDetails::from(item)).into_response()),
        None => Err(AppError::ItemNotFound),
    }
}

#[instrument(skip(state, body))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, HeaderMap, Json<CreatedResponse>), AppError> {
    let new = validation::new_item(&body)?;

    let item = match repo::create(&state.db, &new).await {
        Ok(i) => i,
        Err(StoreError::ForeignKey) => {
            warn!(category_id = new.category_id, "item references unknown category");
            return Err(AppError::UnknownCategory);
        }
        Err(e) => return Err(e.into()),
    };

    info!(item_id = item.id, category_id = item.category_id, %username, "item created");
    Ok(created(
        Some(format!("/items/{}", item.id)),
        item.id,
        "Item created successfully",
    ))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    uri: Uri,
    JsonPayload(body): JsonPayload,
) -> Result<Json<MessageResponse>, AppError> {
    let id = required_id(item_tail(&uri))?;
    let patch = validation::item_patch(&body)?;

    match repo::update(&state.db, id, patch).await {
        Ok(0) => Err(AppError::ItemNotFound),
        Ok(_) => {
            info!(item_id = id, %username, "item updated");
            Ok(MessageResponse::new("Item updated successfully"))
        }
        Err(StoreError::ForeignKey) => {
            warn!(item_id = id, "update references unknown category");
            Err(AppError::UnknownCategory)
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    uri: Uri,
) -> Result<Json<MessageResponse>, AppError> {
    let id = required_id(item_tail(&uri))?;

    match repo::delete(&state.db, id).await? {
        0 => Err(AppError::ItemNotFound),
        _ => {
            info!(item_id = id, %username, "item deleted");
            Ok(MessageResponse::new("Item deleted successfully"))
        }
    }
}
