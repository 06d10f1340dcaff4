use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use inventory_api::{
    app::build_app,
    auth::jwt::JwtKeys,
    config::{AppConfig, JwtConfig},
    state::AppState,
};
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

async fn spawn_app() -> Router {
    let state = AppState::from_config(AppConfig::ephemeral(SECRET))
        .await
        .expect("in-memory state");
    build_app(state)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
        Some(b) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(b)
        }
        None => Body::empty(),
    };

    let res = app
        .clone()
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json",
        "{uri} must answer with JSON"
    );
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string())).await
}

async fn login_as(app: &Router, username: &str, password: &str) -> String {
    let creds = json!({"username": username, "password": password});
    let (status, _) = send(app, Method::POST, "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(app, Method::POST, "/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}

async fn seed_item(app: &Router, token: &str) -> i64 {
    let (status, cat) = send(
        app,
        Method::POST,
        "/categories",
        Some(token),
        Some(json!({"name": "Tools"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, item) = send(
        app,
        Method::POST,
        "/items",
        Some(token),
        Some(json!({
            "category_id": cat["id"],
            "name": "Hammer",
            "description": "claw",
            "price": 9.5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    item["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_build_inventory() {
    let app = spawn_app().await;

    let creds = json!({"username": "alice", "password": "pw1"});
    let (status, body) = send(&app, Method::POST, "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, Method::POST, "/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_owned();

    let (status, _) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({"name": "Tools"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/items",
        Some(&token),
        Some(json!({"category_id": 1, "name": "Hammer", "price": 9.5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": id, "name": "Hammer", "description": "", "price": 9.5, "category": "Tools"}])
    );

    let (status, body) = send(&app, Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1, "name": "Tools"}]));

    let (status, body) = send(&app, Method::GET, &format!("/items/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Hammer");
    assert_eq!(body["price"], 9.5);
    assert_eq!(body["category_id"], 1);
    assert_eq!(body["category"], "Tools");
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn gated_routes_require_a_valid_bearer_token() {
    let app = spawn_app().await;
    let payload = Some(json!({"name": "Tools"}));

    let (status, body) = send(&app, Method::POST, "/categories", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/categories")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::from(payload.clone().unwrap().to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/categories", Some("garbage"), payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtKeys::new(&JwtConfig {
        secret: "other-secret".into(),
        issuer: "inventory-api".into(),
        ttl_minutes: 180,
    })
    .sign("alice")
    .unwrap();
    let (status, _) = send(&app, Method::POST, "/categories", Some(&forged), payload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // auth is checked before the body or the id are looked at
    let (status, _) = send_raw(&app, Method::POST, "/items", None, Some("{oops".into())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::PUT, "/items/abc", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::DELETE, "/items/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_stop_working_three_hours_after_issue() {
    let app = spawn_app().await;
    let keys = JwtKeys::new(&AppConfig::ephemeral(SECRET).jwt);
    let now = OffsetDateTime::now_utc();

    let fresh = keys
        .sign_at("alice", now - Duration::hours(3) + Duration::minutes(1))
        .unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&fresh),
        Some(json!({"name": "Tools"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let stale = keys.sign_at("alice", now - Duration::hours(3)).unwrap();
    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&stale),
        Some(json!({"name": "Paint"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid or expired token");
}

#[tokio::test]
async fn duplicate_category_is_rejected_without_a_second_row() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;

    for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/categories",
            Some(&token),
            Some(json!({"name": "Tools"})),
        )
        .await;
        assert_eq!(status, expected);
        if expected == StatusCode::BAD_REQUEST {
            assert_eq!(body["error"], "duplicate_category");
        }
    }

    let (_, body) = send(&app, Method::GET, "/categories", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn item_with_unknown_category_is_rejected() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/items",
        Some(&token),
        Some(json!({"category_id": 7, "name": "Hammer", "price": 9.5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "foreign_key_violation");

    let (_, body) = send(&app, Method::GET, "/items", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_payloads_are_400() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;

    let (status, body) =
        send_raw(&app, Method::POST, "/categories", Some(&token), Some("{oops".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_json");

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_field");

    let (status, body) = send(
        &app,
        Method::POST,
        "/items",
        Some(&token),
        Some(json!({"category_id": 1, "name": "Hammer"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_field");

    let (status, _) = send(
        &app,
        Method::POST,
        "/items",
        Some(&token),
        Some(json!({"category_id": 1, "name": "Hammer", "price": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/login", None, Some(json!({"username": "alice"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_field");
}

#[tokio::test]
async fn put_changes_only_supplied_fields() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;
    let id = seed_item(&app, &token).await;
    let uri = format!("/items/{id}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no_fields_provided");

    let (status, _) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({"price": 9.99}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["price"], 9.99);
    assert_eq!(body["name"], "Hammer");
    assert_eq!(body["description"], "claw");
    assert_eq!(body["category"], "Tools");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"category_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "foreign_key_violation");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/items/4242",
        Some(&token),
        Some(json!({"name": "Mallet"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_items_are_gone() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;
    let id = seed_item(&app, &token).await;
    let uri = format!("/items/{id}");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "item_not_found");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_ids() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;
    seed_item(&app, &token).await;

    let (status, body) = send(&app, Method::GET, "/items/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::PUT, "/items/abc", Some(&token), Some(json!({"price": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_item_id");

    let (status, _) = send(&app, Method::DELETE, "/items/-1", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_registration_of_a_username_fails() {
    let app = spawn_app().await;
    login_as(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({"username": "alice", "password": "pw2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_username");

    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "alice", "password": "pw1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "alice", "password": "pw2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "nobody", "password": "pw1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_and_methods_are_404() {
    let app = spawn_app().await;
    for (method, uri) in [
        (Method::GET, "/nope"),
        (Method::GET, "/register"),
        (Method::DELETE, "/categories"),
        (Method::PATCH, "/items/1"),
        (Method::PUT, "/items"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "not_found");
    }
}

#[tokio::test]
async fn empty_and_undecodable_item_tails() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;
    seed_item(&app, &token).await;

    for uri in ["/items/", "/items/%FF", "/items/a/b/"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}");
        assert_eq!(body.as_array().unwrap().len(), 1, "GET {uri}");
    }

    for uri in ["/items/", "/items/%FF"] {
        let (status, body) = send(&app, Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "DELETE {uri}");
        assert_eq!(body["error"], "invalid_item_id");

        let (status, body) =
            send(&app, Method::PUT, uri, Some(&token), Some(json!({"price": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "PUT {uri}");
        assert_eq!(body["error"], "invalid_item_id");
    }

    let (status, _) = send(&app, Method::DELETE, "/items/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_item_location_points_at_the_item() {
    let app = spawn_app().await;
    let token = login_as(&app, "alice", "pw1").await;
    let (_, cat) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({"name": "Tools"})),
    )
    .await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({"category_id": cat["id"], "name": "Hammer", "price": 3}).to_string(),
        ))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()[header::LOCATION].to_str().unwrap().to_owned();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(location, format!("/items/{}", body["id"]));

    let (status, item) = send(&app, Method::GET, &location, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Hammer");
}

#[tokio::test]
async fn storage_failures_are_500_with_the_error_envelope() {
    let state = AppState::from_config(AppConfig::ephemeral(SECRET))
        .await
        .expect("in-memory state");
    sqlx::query("DROP TABLE items")
        .execute(&state.db)
        .await
        .unwrap();
    let app = build_app(state);

    let (status, body) = send(&app, Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(body["message"].is_string());
}
