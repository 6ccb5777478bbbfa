// ABOUTME: Endpoint-level tests for the refresh and setup-project routes
// ABOUTME: Drives the assembled router through oneshot requests with encrypted cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use cloudsetup_server::{provisioning::StubCloudClient, server};
use http::{header::SET_COOKIE, HeaderMap, Method, StatusCode};
use httpmock::MockServer;
use serde_json::json;
use std::{sync::Arc, time::Duration};

const REFRESH_URI: &str = "/api/auth/refresh";
const SETUP_URI: &str = "/api/cloud/setup-project";

fn set_cookies_named<'a>(headers: &'a HeaderMap, name: &str) -> Vec<&'a http::HeaderValue> {
    let prefix = format!("{name}=");
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter(|v| v.to_str().is_ok_and(|s| s.starts_with(&prefix)))
        .collect()
}

#[tokio::test]
async fn refresh_without_session_is_unauthorized() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::default()),
    );
    let router = server::router(resources);

    let response = common::send(router, Method::POST, REFRESH_URI, &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["category"], "AUTHENTICATION");
    assert_eq!(
        response.body["error"],
        "Authentication required. Please sign in again."
    );
}

#[tokio::test]
async fn refresh_returns_stored_fresh_token_unchanged() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::default()),
    );
    let session = common::test_session();
    let token = common::fresh_token();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &token)
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources);
    let response = common::send(router, Method::POST, REFRESH_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["access_token"], "access-fresh");
    assert_eq!(response.body["expires_at"], json!(token.expires_at));
    assert!(set_cookies_named(&response.headers, "cs_token").is_empty());
}

#[tokio::test]
async fn refresh_with_session_but_no_token_asks_for_sign_in() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::default()),
    );
    let session_cookie = resources
        .session_store
        .store(&common::test_session())
        .unwrap();
    let cookies = [common::cookie_pair(&session_cookie)];

    let router = server::router(resources);
    let response = common::send(router, Method::GET, REFRESH_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["error"],
        "Session expired. Please sign in again."
    );
}

#[tokio::test]
async fn refresh_renews_expired_token_and_rewrites_the_cookie() {
    let oauth = MockServer::start_async().await;
    oauth
        .mock_async(|when, then| {
            when.method(httpmock::Method::POST).path("/token");
            then.status(200).json_body(json!({
                "access_token": "access-renewed",
                "expires_in": 3600,
                "token_type": "Bearer",
            }));
        })
        .await;

    let resources = common::test_resources(
        common::test_config(Some(oauth.url("/token")), true),
        Arc::new(StubCloudClient::default()),
    );
    let session = common::test_session();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &common::expired_token(true))
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources);
    let response = common::send(router, Method::POST, REFRESH_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["access_token"], "access-renewed");
    assert_eq!(set_cookies_named(&response.headers, "cs_token").len(), 1);
}

#[tokio::test]
async fn terminal_refresh_rejection_discards_the_stored_token() {
    let oauth = MockServer::start_async().await;
    oauth
        .mock_async(|when, then| {
            when.method(httpmock::Method::POST).path("/token");
            then.status(400).json_body(json!({ "error": "invalid_grant" }));
        })
        .await;

    let resources = common::test_resources(
        common::test_config(Some(oauth.url("/token")), true),
        Arc::new(StubCloudClient::default()),
    );
    let session = common::test_session();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &common::expired_token(true))
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources);
    let response = common::send(router, Method::POST, REFRESH_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["category"], "API");

    // The dead token set is expired out of the cookie jar, so the next
    // request degrades to "sign in again" instead of retrying the refresh.
    let discards = set_cookies_named(&response.headers, "cs_token");
    assert_eq!(discards.len(), 1);
    let text = discards[0].to_str().unwrap();
    assert!(text.starts_with("cs_token=;"));
    assert!(text.contains("Max-Age=0"));
}

#[tokio::test]
async fn transient_refresh_failure_keeps_the_stored_token() {
    let oauth = MockServer::start_async().await;
    oauth
        .mock_async(|when, then| {
            when.method(httpmock::Method::POST).path("/token");
            then.status(500).body("upstream exploded");
        })
        .await;

    let resources = common::test_resources(
        common::test_config(Some(oauth.url("/token")), true),
        Arc::new(StubCloudClient::default()),
    );
    let session = common::test_session();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &common::expired_token(true))
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources);
    let response = common::send(router, Method::POST, REFRESH_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookies_named(&response.headers, "cs_token").is_empty());
}

#[tokio::test]
async fn start_setup_without_access_token_is_unauthorized() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::default()),
    );
    let session_cookie = resources
        .session_store
        .store(&common::test_session())
        .unwrap();
    let cookies = [common::cookie_pair(&session_cookie)];

    let router = server::router(resources);
    let response = common::send(router, Method::POST, SETUP_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["category"], "AUTHENTICATION");
}

#[tokio::test]
async fn poll_without_a_run_is_not_found() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::default()),
    );
    let session_cookie = resources
        .session_store
        .store(&common::test_session())
        .unwrap();
    let cookies = [common::cookie_pair(&session_cookie)];

    let router = server::router(resources);
    let response = common::send(router, Method::GET, SETUP_URI, &cookies).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "No project setup in progress");
}

#[tokio::test]
async fn setup_runs_to_completion_and_links_the_project_cookie() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::new(Duration::ZERO)),
    );
    let session = common::test_session();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &common::fresh_token())
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources);

    let started = common::send(router.clone(), Method::POST, SETUP_URI, &cookies).await;
    assert_eq!(started.status, StatusCode::ACCEPTED);
    assert_eq!(started.body["status"], "pending");

    // Poll until the detached run reaches a terminal phase.
    let mut last = started.body.clone();
    let mut project_set_cookie = None;
    for _ in 0..50 {
        let polled = common::send(router.clone(), Method::GET, SETUP_URI, &cookies).await;
        assert_eq!(polled.status, StatusCode::OK);
        last = polled.body.clone();
        if last["status"] == "complete" || last["status"] == "failed" {
            project_set_cookie = set_cookies_named(&polled.headers, "cs_project")
                .first()
                .map(|v| (*v).clone());
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(last["status"], "complete");
    assert_eq!(last["message"], "Project setup complete");
    let project_id = last["project_id"].as_str().unwrap();
    assert!(project_id.starts_with("ana-"));

    // Completion links the project id through an encrypted cookie; once the
    // client presents it, later polls stop re-issuing it.
    let project_cookie = project_set_cookie.expect("completed poll must set the project cookie");
    let mut cookies_with_project = cookies.to_vec();
    cookies_with_project.push(common::cookie_pair(&project_cookie));

    let again = common::send(router, Method::GET, SETUP_URI, &cookies_with_project).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["status"], "complete");
    assert!(set_cookies_named(&again.headers, "cs_project").is_empty());
}

#[tokio::test]
async fn new_setup_run_supersedes_the_previous_record() {
    let resources = common::test_resources(
        common::test_config(None, true),
        Arc::new(StubCloudClient::new(Duration::ZERO)),
    );
    let session = common::test_session();

    let session_cookie = resources.session_store.store(&session).unwrap();
    let token_cookie = resources
        .credential_store
        .store(&session.user_id, &common::fresh_token())
        .unwrap();
    let cookies = [
        common::cookie_pair(&session_cookie),
        common::cookie_pair(&token_cookie),
    ];

    let router = server::router(resources.clone());

    let first = common::send(router.clone(), Method::POST, SETUP_URI, &cookies).await;
    assert_eq!(first.status, StatusCode::ACCEPTED);

    // A second POST discards the old record and reseeds pending.
    let second = common::send(router.clone(), Method::POST, SETUP_URI, &cookies).await;
    assert_eq!(second.status, StatusCode::ACCEPTED);
    assert_eq!(second.body["status"], "pending");

    let record = resources.progress.get(&session.user_id).unwrap();
    assert!(matches!(
        record.status,
        cloudsetup_server::provisioning::SetupPhase::Pending
            | cloudsetup_server::provisioning::SetupPhase::Creating
            | cloudsetup_server::provisioning::SetupPhase::Billing
            | cloudsetup_server::provisioning::SetupPhase::Api
            | cloudsetup_server::provisioning::SetupPhase::Complete
    ));
}
