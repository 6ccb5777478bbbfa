// ABOUTME: Project setup endpoints that start a detached provisioning run and serve polls
// ABOUTME: POST supersedes any prior run and returns 202; GET reports the shared progress record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Project setup endpoints
//!
//! `POST` clears any prior progress record, seeds `pending`, and spawns the
//! workflow detached from the request; results flow only through the shared
//! progress tracker. `GET` is the polling side, surfacing stale runs as
//! `failed` and attaching the linked-project cookie on completion.

use super::authenticate;
use crate::{
    errors::AppError,
    provisioning::{SetupOptions, SetupPhase, SetupProgress},
    resources::ServerResources,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Project setup route handlers
pub struct SetupRoutes;

impl SetupRoutes {
    /// Create the setup routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/cloud/setup-project",
                post(Self::start_setup).get(Self::poll_setup),
            )
            .with_state(resources)
    }

    /// Start a provisioning run for the session's user.
    ///
    /// Requires a usable access token on the session. Any in-flight run is
    /// superseded: its progress record is discarded and a fresh `pending`
    /// one is seeded before the workflow is spawned. Responds 202
    /// immediately; the handler never awaits the run.
    async fn start_setup(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session = authenticate(&headers, &resources)?;

        let valid = match resources
            .token_service
            .get_valid_access_token(&session, &headers)
            .await
        {
            Ok(valid) => valid,
            Err(error) => return Ok(super::refresh_failure_response(error, &resources)),
        };
        let Some(valid) = valid else {
            return Err(AppError::authentication(
                "No access token available for cloud setup",
            ));
        };

        let user_id = session.user_id.clone();
        resources.progress.clear(&user_id);
        resources.progress.put(&user_id, SetupProgress::pending());

        let options = SetupOptions {
            user_id: user_id.clone(),
            email: session.email.clone(),
            access_token: valid.access_token,
        };

        let provisioner = resources.provisioner.clone();
        let tracker = resources.progress.clone();
        tokio::spawn(async move {
            provisioner
                .setup_project(&options, |snapshot| tracker.put(&options.user_id, snapshot))
                .await;
        });

        tracing::info!(user_id, "project setup started");

        let mut response =
            (StatusCode::ACCEPTED, Json(json!({ "status": "pending" }))).into_response();
        if let Some(cookie) = valid.set_cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Ok(response)
    }

    /// Report the current progress record for the session's user.
    ///
    /// 404 when no run exists; stale non-terminal records read as `failed`.
    /// On `complete` the linked project id is persisted through the sibling
    /// project store if not already present.
    async fn poll_setup(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session = authenticate(&headers, &resources)?;

        let Some(record) = resources.progress.get(&session.user_id) else {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "No project setup in progress" })),
            )
                .into_response());
        };

        let project_cookie = match (&record.status, &record.project_id) {
            (SetupPhase::Complete, Some(project_id))
                if resources.project_store.retrieve(&headers).is_none() =>
            {
                Some(resources.project_store.store(project_id)?)
            }
            _ => None,
        };

        let mut response = (StatusCode::OK, Json(record)).into_response();
        if let Some(cookie) = project_cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Ok(response)
    }
}
