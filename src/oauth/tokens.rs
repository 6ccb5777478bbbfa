// ABOUTME: Token service orchestrating retrieve, expiry check, refresh, and re-store
// ABOUTME: Callers receive a valid access token or None, never an expired one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Valid-access-token orchestration
//!
//! `None` uniformly means "re-authenticate": no stored token set, or an
//! expired one with no refresh token. An expired set with a refresh token is
//! refreshed and re-stored before the access token is handed out, so a
//! returned token's expiry is always in the future.

use super::{is_expired, OAuthClient};
use crate::{
    errors::AppResult,
    models::{Session, TokenSet},
    store::CredentialStore,
};
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;

/// A usable access token plus any cookie rewrite produced by a refresh
#[derive(Debug)]
pub struct ValidToken {
    /// Access token guaranteed valid past the expiry buffer
    pub access_token: String,
    /// Token expiry, unix seconds
    pub expires_at: i64,
    /// `Set-Cookie` re-storing the refreshed token set, when a refresh ran
    pub set_cookie: Option<HeaderValue>,
}

/// Orchestrates the credential store and the refresh-grant client.
///
/// Concurrent refreshes for the same user are not serialized: two
/// near-simultaneous expired-token requests may each perform an independent
/// exchange. The provider's refresh grant tolerates this; a hardened
/// deployment would add per-user single-flight coordination here.
#[derive(Clone)]
pub struct TokenService {
    store: CredentialStore,
    client: Arc<OAuthClient>,
}

impl TokenService {
    /// Create a service over the shared store and OAuth client
    #[must_use]
    pub const fn new(store: CredentialStore, client: Arc<OAuthClient>) -> Self {
        Self { store, client }
    }

    /// Return a valid access token for the session's user, refreshing first
    /// if the stored one is within the expiry buffer.
    ///
    /// Returns `Ok(None)` when no token set is stored, and when the stored
    /// set is expired with no refresh token — both mean "re-authenticate".
    ///
    /// # Errors
    ///
    /// Propagates refresh-exchange failures (`Authentication`, `Network`,
    /// `Api`) and re-storage failures (`Database`).
    pub async fn get_valid_access_token(
        &self,
        session: &Session,
        headers: &HeaderMap,
    ) -> AppResult<Option<ValidToken>> {
        let Some(token) = self.store.retrieve(headers, &session.user_id) else {
            return Ok(None);
        };

        if !is_expired(token.expires_at) {
            return Ok(Some(ValidToken {
                access_token: token.access_token,
                expires_at: token.expires_at,
                set_cookie: None,
            }));
        }

        let Some(refresh_token) = token.refresh_token.as_deref() else {
            tracing::info!(
                user_id = %session.user_id,
                "access token expired with no refresh token; re-authentication required"
            );
            return Ok(None);
        };

        tracing::info!(user_id = %session.user_id, "access token expired; refreshing");
        let refreshed = self.client.refresh(refresh_token).await?;

        // Refresh responses do not always include a new refresh token, so
        // the original is preserved alongside the replaced access token.
        let updated = TokenSet {
            access_token: refreshed.access_token,
            refresh_token: token.refresh_token.clone(),
            expires_at: refreshed.expires_at,
        };
        let set_cookie = self.store.store(&session.user_id, &updated)?;

        Ok(Some(ValidToken {
            access_token: updated.access_token,
            expires_at: updated.expires_at,
            set_cookie: Some(set_cookie),
        }))
    }
}
