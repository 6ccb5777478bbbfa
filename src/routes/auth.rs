// ABOUTME: Token refresh route handler backed by the token service
// ABOUTME: Returns a valid access token or 401 when the session must re-authenticate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Token refresh endpoint

use super::authenticate;
use crate::{errors::AppError, resources::ServerResources};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Successful refresh response body
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Valid access token
    pub access_token: String,
    /// Token expiry, unix seconds
    pub expires_at: i64,
}

/// Token refresh route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the refresh routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/refresh", post(Self::refresh).get(Self::refresh))
            .with_state(resources)
    }

    /// Hand out a valid access token, refreshing first when needed.
    ///
    /// 200 with `{access_token, expires_at}` (plus a `Set-Cookie` rewrite
    /// when a refresh ran), or 401 when the session must re-authenticate.
    /// A terminal refresh rejection additionally expires the token cookie.
    async fn refresh(
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
            tracing::info!(user_id = %session.user_id, "no usable token; session must re-authenticate");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Session expired. Please sign in again." })),
            )
                .into_response());
        };

        let body = RefreshResponse {
            access_token: valid.access_token,
            expires_at: valid.expires_at,
        };

        let mut response = (StatusCode::OK, Json(body)).into_response();
        if let Some(cookie) = valid.set_cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Ok(response)
    }
}
