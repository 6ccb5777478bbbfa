// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Provides resource construction, cookie helpers, and a oneshot request harness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Shared test utilities for `cloudsetup_server`

use axum::{body::Body, Router};
use base64::{engine::general_purpose, Engine};
use cloudsetup_server::{
    config::ServerConfig,
    crypto::cipher::generate_key,
    models::{Session, TokenSet},
    provisioning::CloudResourceClient,
    resources::ServerResources,
};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Configuration for tests: in-memory key, optional OAuth client credentials
pub fn test_config(token_url: Option<String>, with_oauth_client: bool) -> ServerConfig {
    ServerConfig {
        oauth_client_id: with_oauth_client.then(|| "test-client-id".to_owned()),
        oauth_client_secret: with_oauth_client.then(|| "test-client-secret".to_owned()),
        oauth_token_url: token_url.unwrap_or_else(|| "http://127.0.0.1:1/token".to_owned()),
        cookie_encryption_key: general_purpose::STANDARD.encode(generate_key()),
        http_port: 0,
        secure_cookies: false,
    }
}

/// Build server resources over the given cloud client
pub fn test_resources(
    config: ServerConfig,
    cloud_client: Arc<dyn CloudResourceClient>,
) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(config, cloud_client).unwrap())
}

/// Standard test session
pub fn test_session() -> Session {
    Session {
        user_id: "user-1".to_owned(),
        email: "ana@example.com".to_owned(),
        name: Some("Ana".to_owned()),
    }
}

/// Token set that is valid well past the expiry buffer
pub fn fresh_token() -> TokenSet {
    TokenSet {
        access_token: "access-fresh".to_owned(),
        refresh_token: Some("refresh-original".to_owned()),
        expires_at: chrono::Utc::now().timestamp() + 3600,
    }
}

/// Token set inside the expiry buffer, with or without a refresh token
pub fn expired_token(with_refresh: bool) -> TokenSet {
    TokenSet {
        access_token: "access-stale".to_owned(),
        refresh_token: with_refresh.then(|| "refresh-original".to_owned()),
        expires_at: chrono::Utc::now().timestamp() - 60,
    }
}

/// Reduce a `Set-Cookie` header value to its `name=value` pair
pub fn cookie_pair(set_cookie: &HeaderValue) -> String {
    set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

/// Request headers carrying the given cookie pairs
pub fn headers_with_cookies(pairs: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if !pairs.is_empty() {
        headers.insert(http::header::COOKIE, pairs.join("; ").parse().unwrap());
    }
    headers
}

/// Decoded response from the oneshot harness
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Execute one request against a router without binding a listener
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    cookie_pairs: &[String],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookie_pairs.is_empty() {
        builder = builder.header(http::header::COOKIE, cookie_pairs.join("; "));
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
