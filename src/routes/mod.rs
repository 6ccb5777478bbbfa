// ABOUTME: Route module organization for the HTTP boundary
// ABOUTME: Thin handlers that authenticate the session and delegate to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! HTTP boundary handlers
//!
//! Two route groups front the subsystem: token refresh and project setup.
//! Handlers authenticate the caller from the encrypted session cookie,
//! invoke the service layer, and map results and errors to status codes.

/// Token refresh endpoint
pub mod auth;
/// Project setup start/poll endpoints
pub mod setup;

pub use auth::{AuthRoutes, RefreshResponse};
pub use setup::SetupRoutes;

use crate::{
    errors::{AppError, ErrorCategory},
    models::Session,
    resources::ServerResources,
};
use axum::response::{IntoResponse, Response};
use http::{header, HeaderMap};

/// Decode and validate the session cookie, or fail with 401
///
/// # Errors
/// Returns an `Authentication` error when the session cookie is missing or
/// undecodable.
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> Result<Session, AppError> {
    resources
        .session_store
        .retrieve(headers)
        .ok_or_else(|| AppError::authentication("Missing or invalid session"))
}

/// Map a token-service failure to a response, discarding the stored token
/// set when the provider has rejected it outright.
///
/// A 4xx from the token endpoint (e.g. `invalid_grant` for a revoked
/// refresh token) means the stored set can never succeed again, so the
/// error response carries an expiring token cookie and the next request
/// degrades to "sign in again" instead of re-attempting a doomed refresh.
/// Transient failures (network, provider 5xx) leave the set in place.
pub(crate) fn refresh_failure_response(
    error: AppError,
    resources: &ServerResources,
) -> Response {
    let rejected = error.category == ErrorCategory::Api
        && error
            .status_code
            .is_some_and(|status| (400..500).contains(&status));

    let mut response = error.into_response();
    if rejected {
        tracing::info!("token endpoint rejected the stored credentials; discarding them");
        response
            .headers_mut()
            .append(header::SET_COOKIE, resources.credential_store.delete());
    }
    response
}
