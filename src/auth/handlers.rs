use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::LoginResponse,
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::User,
    },
    db::StoreError,
    dto::MessageResponse,
    error::{not_found, AppError},
    extractors::JsonPayload,
    state::AppState,
    validation,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(not_found))
        .route("/login", post(login).fallback(not_found))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let creds = validation::registration(&body)?;

    if User::find_by_username(&state.db, &creds.username).await?.is_some() {
        warn!(username = %creds.username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password_blocking(creds.password).await?;

    // the lookup above can race another registration; the UNIQUE index decides
    let user = match User::create(&state.db, &creds.username, &hash).await {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!(username = %creds.username, "username already registered");
            return Err(AppError::DuplicateUsername);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully"),
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<LoginResponse>, AppError> {
    let creds = validation::credentials(&body)?;

    let Some(user) = User::find_by_username(&state.db, &creds.username).await? else {
        warn!(username = %creds.username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    let ok = verify_password_blocking(creds.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.sign(&user.username)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
    }))
}
