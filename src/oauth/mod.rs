// ABOUTME: OAuth module for token expiry checks and the refresh-token grant
// ABOUTME: Keeps handed-out access tokens inside their validity window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! # Token Refresh Engine
//!
//! Checks token expiry against a fixed buffer, exchanges refresh tokens with
//! the identity provider, and re-stores the resulting token set through the
//! encrypted credential store.

/// Refresh-grant exchange with the identity provider
pub mod client;
/// Orchestration of retrieve / expiry-check / refresh / re-store
pub mod tokens;

pub use client::{OAuthClient, RefreshedToken};
pub use tokens::{TokenService, ValidToken};

/// Seconds before actual expiry at which a token is already treated as
/// expired, so a token is never handed out moments before it dies
/// mid-request.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Whether an access token expiring at `expires_at` (unix seconds) is
/// expired or within the refresh buffer of expiring.
#[must_use]
pub fn is_expired(expires_at: i64) -> bool {
    chrono::Utc::now().timestamp() + EXPIRY_BUFFER_SECS >= expires_at
}
