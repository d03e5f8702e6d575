use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, Request, StatusCode,
    },
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    app,
    config::{
        settings::{AppConfig, StoreBackend},
        startup::AppState,
    },
    repositories::{memory_poll_repository::MemoryPollRepository, poll_repository::PollRepository},
    utils::jwt::Claims,
};

pub const TEST_SECRET: &str = "pollify-test-secret";

pub fn setup_test_app() -> (Router, AppState) {
    let config = AppConfig {
        store: StoreBackend::Memory,
        jwt_secret: TEST_SECRET.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origin: HeaderValue::from_static("http://localhost:8000"),
    };
    let repository = PollRepository::Memory(MemoryPollRepository::new());
    let app_state = AppState::new(repository, config);

    (app::create_app(app_state.clone()), app_state)
}

pub fn token_for(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(7)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to create test token")
}

pub async fn stored_poll_count(app_state: &AppState) -> usize {
    match &app_state.repository {
        PollRepository::Memory(repo) => repo.poll_count().await,
        PollRepository::Mongo(_) => panic!("tests run against the memory store"),
    }
}

pub async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Body>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            body
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    send_request(
        app,
        Method::POST,
        &format!("/api/quick-poll{path}"),
        Some(Body::from(body.to_string())),
        None,
    )
    .await
}

pub async fn post_json_as(
    app: &Router,
    path: &str,
    body: Value,
    bearer: &str,
) -> (StatusCode, Value) {
    send_request(
        app,
        Method::POST,
        &format!("/api/quick-poll{path}"),
        Some(Body::from(body.to_string())),
        Some(bearer),
    )
    .await
}

/// Creates the "Pizza?" poll and returns `(pollId, adminId)`.
pub async fn create_pizza_poll(app: &Router) -> (String, String) {
    let (status, response) = post_json(
        app,
        "/create",
        json!({
            "description": "Pizza?",
            "options": ["Yes", "No"],
            "duration": 3_600_000
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let poll_id = response["data"]["pollId"].as_str().unwrap().to_string();
    let admin_id = response["data"]["adminId"].as_str().unwrap().to_string();
    (poll_id, admin_id)
}
