// ABOUTME: Encrypted cookie-backed stores for token sets, project ids, and sessions
// ABOUTME: Seals payloads with the process-wide AEAD cipher and degrades decrypt failures to None
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Encrypted credential storage
//!
//! Each store persists an opaque AEAD blob as an HTTP-only cookie. A missing
//! or garbled blob degrades to "no value" — the caller sees a sign-in prompt
//! rather than a failed request. The outer cookie lifetime bounds how long a
//! refresh token may be used; the inner `expires_at` bounds the access token.

use crate::{
    crypto::TokenCipher,
    errors::{AppResult, ErrorCategory, WrapErr},
    models::{Session, TokenSet},
    security::{cookies, redaction},
};
use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie holding the encrypted token set
pub const TOKEN_COOKIE: &str = "cs_token";
/// Cookie holding the encrypted linked cloud project id
pub const PROJECT_COOKIE: &str = "cs_project";
/// Cookie holding the encrypted session
pub const SESSION_COOKIE: &str = "cs_session";

/// Encrypted envelope binding a token set to its owning user.
///
/// The user id inside the sealed payload is checked on retrieval so a blob
/// replayed from another account reads as "no token".
#[derive(Debug, Serialize, Deserialize)]
struct TokenEnvelope {
    user_id: String,
    token: TokenSet,
}

/// Cookie-backed store for one user's encrypted [`TokenSet`]
#[derive(Clone)]
pub struct CredentialStore {
    cipher: Arc<TokenCipher>,
    secure_cookies: bool,
}

impl CredentialStore {
    /// Create a store sharing the process-wide cipher
    #[must_use]
    pub const fn new(cipher: Arc<TokenCipher>, secure_cookies: bool) -> Self {
        Self {
            cipher,
            secure_cookies,
        }
    }

    /// Encrypt and persist a token set, returning the `Set-Cookie` value.
    ///
    /// # Errors
    /// Returns a `Database` error if serialization or encryption fails.
    pub fn store(&self, user_id: &str, token: &TokenSet) -> AppResult<HeaderValue> {
        let envelope = TokenEnvelope {
            user_id: user_id.to_owned(),
            token: token.clone(),
        };
        let plaintext = serde_json::to_vec(&envelope).wrap_err(
            ErrorCategory::Database,
            "store",
            "store_token",
        )?;
        let blob = self
            .cipher
            .seal(&plaintext)
            .wrap_err(ErrorCategory::Database, "store", "store_token")?;

        if let Ok(mut logged) = serde_json::to_value(token) {
            redaction::redact_sensitive(&mut logged);
            tracing::debug!(user_id, token = %logged, "stored token set");
        }

        cookies::build_cookie(TOKEN_COOKIE, &blob, self.secure_cookies)
    }

    /// Decrypt and return the stored token set, or `None`.
    ///
    /// Absent cookie, decryption failure, or a user-id mismatch all degrade
    /// to `None`: a garbled credential means "please sign in again", never a
    /// failed request.
    #[must_use]
    pub fn retrieve(&self, headers: &HeaderMap, user_id: &str) -> Option<TokenSet> {
        let blob = cookies::get_cookie_value(headers, TOKEN_COOKIE)?;

        let plaintext = match self.cipher.open(&blob) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "token cookie failed decryption; treating as absent");
                return None;
            }
        };

        let envelope: TokenEnvelope = match serde_json::from_slice(&plaintext) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "token payload malformed; treating as absent");
                return None;
            }
        };

        if envelope.user_id != user_id {
            tracing::warn!(user_id, "token cookie belongs to another user; treating as absent");
            return None;
        }

        tracing::debug!(user_id, "retrieved token set");
        Some(envelope.token)
    }

    /// Remove the token cookie. Idempotent.
    #[must_use]
    pub fn delete(&self) -> HeaderValue {
        tracing::debug!("deleted token cookie");
        cookies::expire_cookie(TOKEN_COOKIE, self.secure_cookies)
    }
}

/// Sibling store for the linked cloud project identifier
#[derive(Clone)]
pub struct ProjectStore {
    cipher: Arc<TokenCipher>,
    secure_cookies: bool,
}

impl ProjectStore {
    /// Create a store sharing the process-wide cipher
    #[must_use]
    pub const fn new(cipher: Arc<TokenCipher>, secure_cookies: bool) -> Self {
        Self {
            cipher,
            secure_cookies,
        }
    }

    /// Persist the linked project id, returning the `Set-Cookie` value.
    ///
    /// # Errors
    /// Returns a `Database` error if encryption fails.
    pub fn store(&self, project_id: &str) -> AppResult<HeaderValue> {
        let blob = self
            .cipher
            .seal(project_id.as_bytes())
            .wrap_err(ErrorCategory::Database, "store", "store_project")?;

        tracing::debug!(project_id, "stored linked project id");
        cookies::build_cookie(PROJECT_COOKIE, &blob, self.secure_cookies)
    }

    /// Return the linked project id, or `None` on absence or decrypt failure
    #[must_use]
    pub fn retrieve(&self, headers: &HeaderMap) -> Option<String> {
        let blob = cookies::get_cookie_value(headers, PROJECT_COOKIE)?;

        match self.cipher.open(&blob) {
            Ok(bytes) => String::from_utf8(bytes).ok(),
            Err(e) => {
                tracing::warn!(error = %e, "project cookie failed decryption; treating as absent");
                None
            }
        }
    }

    /// Remove the project cookie. Idempotent.
    #[must_use]
    pub fn delete(&self) -> HeaderValue {
        cookies::expire_cookie(PROJECT_COOKIE, self.secure_cookies)
    }
}

/// Store for the encrypted session established by the sign-in flow.
///
/// The sign-in handshake itself lives outside this crate; handlers here only
/// decode and validate the session it left behind.
#[derive(Clone)]
pub struct SessionStore {
    cipher: Arc<TokenCipher>,
    secure_cookies: bool,
}

impl SessionStore {
    /// Create a store sharing the process-wide cipher
    #[must_use]
    pub const fn new(cipher: Arc<TokenCipher>, secure_cookies: bool) -> Self {
        Self {
            cipher,
            secure_cookies,
        }
    }

    /// Persist a session, returning the `Set-Cookie` value.
    ///
    /// # Errors
    /// Returns a `Database` error if serialization or encryption fails.
    pub fn store(&self, session: &Session) -> AppResult<HeaderValue> {
        let plaintext = serde_json::to_vec(session).wrap_err(
            ErrorCategory::Database,
            "store",
            "store_session",
        )?;
        let blob = self
            .cipher
            .seal(&plaintext)
            .wrap_err(ErrorCategory::Database, "store", "store_session")?;

        cookies::build_cookie(SESSION_COOKIE, &blob, self.secure_cookies)
    }

    /// Decode and validate the session, or `None` on absence or failure
    #[must_use]
    pub fn retrieve(&self, headers: &HeaderMap) -> Option<Session> {
        let blob = cookies::get_cookie_value(headers, SESSION_COOKIE)?;

        let plaintext = match self.cipher.open(&blob) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "session cookie failed decryption; treating as absent");
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&plaintext) {
            Ok(session) if !session.user_id.is_empty() => Some(session),
            Ok(_) => {
                tracing::warn!("session missing required user id; treating as absent");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "session payload malformed; treating as absent");
                None
            }
        }
    }
}
