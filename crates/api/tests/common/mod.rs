#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use marginalia_api::auth::jwt::{Claims, JwtConfig};
use marginalia_api::config::ServerConfig;
use marginalia_api::router::build_app_router;
use marginalia_api::state::AppState;
use marginalia_core::types::AuthInfo;
use marginalia_storage::{MemoryStorage, StorageAdapter, UserDirectory};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_user_ids: vec!["mod".to_string()],
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        },
    }
}

/// Build the full application router over the given storage backend.
///
/// Uses the same `build_app_router` as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_app_with(storage: Arc<dyn StorageAdapter>, users: Option<Arc<MemoryStorage>>) -> Router {
    let config = test_config();
    let state = AppState {
        storage,
        users: users.map(|u| u as Arc<dyn UserDirectory>),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Build the application over a fresh [`MemoryStorage`] that also serves
/// user lookups. The storage handle is returned for seeding and inspection.
pub fn build_test_app() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::with_admins(test_config().admin_user_ids));
    let app = build_app_with(storage.clone(), Some(storage.clone()));
    (app, storage)
}

pub fn user(id: &str, name: &str) -> AuthInfo {
    AuthInfo {
        id: id.to_string(),
        name: name.to_string(),
        image: None,
    }
}

/// Sign a session token for `user` the way the auth provider would.
pub fn token_for(user: &AuthInfo) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        image: user.image.clone(),
        exp: now + 900,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt.secret.as_bytes()),
    )
    .expect("token encoding should succeed")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A single-paragraph document containing `text`.
pub fn doc(text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "doc",
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}
