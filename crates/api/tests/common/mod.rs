//! Shared harness for API integration tests.
//!
//! The app is built with the production router and middleware, backed by the
//! in-memory store and a scripted push transport instead of PostgreSQL and
//! real push services.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use barbershop_api::config::{PushConfig, ServerConfig};
use barbershop_api::router::build_app_router;
use barbershop_api::state::AppState;
use barbershop_notify::testing::{test_signer, MemoryStore, ScriptedTransport};
use barbershop_notify::{PushNotifier, Stores, VapidSigner};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        push: PushConfig::default(),
    }
}

/// A running app plus handles on its collaborators.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
}

/// App with the test VAPID keys loaded.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), Some(test_signer()))
}

/// App without VAPID keys.
pub fn build_unconfigured_app() -> TestApp {
    build_test_app_with(test_config(), None)
}

pub fn build_test_app_with(config: ServerConfig, signer: Option<VapidSigner>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(ScriptedTransport::new());
    let stores = Stores::from_shared(store.clone());
    let notifier = PushNotifier::new(
        stores.clone(),
        transport.clone(),
        signer,
        config.push.delivery_options(),
    );

    let state = AppState {
        pool: None,
        config: Arc::new(config.clone()),
        stores,
        notifier,
    };

    TestApp {
        app: build_app_router(state, &config),
        store,
        transport,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(body)).await
}

/// POST a raw body with the given content type, bypassing JSON encoding.
pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
