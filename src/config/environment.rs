// ABOUTME: Environment configuration for deployment-specific settings
// ABOUTME: Requires the cookie encryption key at startup rather than generating one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Environment-variable driven server configuration
//!
//! Loaded once at process start. The cookie encryption key is REQUIRED: a
//! silently generated ephemeral key would strand every credential written
//! before a restart, so its absence fails startup instead.

use anyhow::{anyhow, Result};
use std::env;

/// Default identity-provider token endpoint (Google OAuth 2.0)
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default HTTP listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Server configuration resolved from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// OAuth client id for the refresh-token grant; absence surfaces as an
    /// authentication error at refresh time, not at startup
    pub oauth_client_id: Option<String>,
    /// OAuth client secret paired with `oauth_client_id`
    pub oauth_client_secret: Option<String>,
    /// Identity-provider token endpoint URL
    pub oauth_token_url: String,
    /// Base64-encoded 32-byte AEAD key for the cookie cipher (required)
    pub cookie_encryption_key: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Whether cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `COOKIE_ENCRYPTION_KEY` is absent or if
    /// `HTTP_PORT` is set to a non-numeric value.
    pub fn from_env() -> Result<Self> {
        let cookie_encryption_key = env::var("COOKIE_ENCRYPTION_KEY").map_err(|_| {
            anyhow!(
                "COOKIE_ENCRYPTION_KEY not set; provide a base64-encoded 32-byte key. \
                 Refusing to generate an ephemeral key: data encrypted before a restart \
                 would become permanently undecryptable."
            )
        })?;

        let http_port = match env::var("HTTP_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow!("HTTP_PORT must be a valid port number, got {port:?}"))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            oauth_client_id: env::var("OAUTH_CLIENT_ID").ok(),
            oauth_client_secret: env::var("OAUTH_CLIENT_SECRET").ok(),
            oauth_token_url: env::var("OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            cookie_encryption_key,
            http_port,
            secure_cookies: environment == "production",
        })
    }

    /// Whether both OAuth client credentials are configured
    #[must_use]
    pub const fn has_oauth_client(&self) -> bool {
        self.oauth_client_id.is_some() && self.oauth_client_secret.is_some()
    }
}
