use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::Serialize;

/// Body returned by write endpoints that have nothing else to say.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: i64,
}

/// 201, with a `Location` header when the new resource is addressable.
pub fn created(
    location: Option<String>,
    id: i64,
    message: &'static str,
) -> (StatusCode, HeaderMap, Json<CreatedResponse>) {
    let mut headers = HeaderMap::new();
    if let Some(value) = location.and_then(|l| HeaderValue::from_str(&l).ok()) {
        headers.insert(header::LOCATION, value);
    }
    (StatusCode::CREATED, headers, Json(CreatedResponse { message, id }))
}
