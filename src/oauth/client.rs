// ABOUTME: Refresh-token grant client for the identity provider's token endpoint
// ABOUTME: Fails fast on missing client credentials before any network call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Refresh-grant exchange with the identity provider

use crate::{
    config::ServerConfig,
    errors::{handle_api_response, AppError, AppResult},
};
use serde::Deserialize;

/// Result of a successful refresh-token grant
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    /// New short-lived access token
    pub access_token: String,
    /// Computed expiry, unix seconds (`now + expires_in`)
    pub expires_at: i64,
}

/// Token endpoint response shape (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: i64,
}

/// Client for the identity provider's token endpoint
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: String,
}

impl OAuthClient {
    /// Build a client from configuration, sharing the process HTTP client
    #[must_use]
    pub fn new(config: &ServerConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            token_url: config.oauth_token_url.clone(),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// - `Authentication` when client credentials are not configured; the
    ///   exchange is doomed, so no network call is attempted.
    /// - `Network` on transport failure.
    /// - `Api` on a non-ok token endpoint response (via
    ///   [`handle_api_response`]).
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshedToken> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret)
        else {
            return Err(AppError::authentication(
                "OAuth client credentials are not configured",
            ));
        };

        tracing::debug!(token_url = %self.token_url, "exchanging refresh token");

        let params = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        let body: TokenEndpointResponse = handle_api_response(response).await?;

        Ok(RefreshedToken {
            access_token: body.access_token,
            expires_at: chrono::Utc::now().timestamp() + body.expires_in,
        })
    }
}
