// ABOUTME: Centralized resource container for dependency injection across handlers
// ABOUTME: Builds the cipher, stores, OAuth client, and provisioner once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Shared server resources
//!
//! Everything expensive or process-wide is constructed once here and shared
//! behind `Arc`, instead of being recreated per request.

use crate::{
    config::ServerConfig,
    crypto::TokenCipher,
    oauth::{OAuthClient, TokenService},
    provisioning::{CloudProvisioner, CloudResourceClient, ProgressTracker},
    store::{CredentialStore, ProjectStore, SessionStore},
};
use anyhow::Result;
use std::sync::Arc;

/// Centralized resource container handed to every route handler
#[derive(Clone)]
pub struct ServerResources {
    /// Resolved environment configuration
    pub config: Arc<ServerConfig>,
    /// Session decoding at the boundary
    pub session_store: SessionStore,
    /// Encrypted token-set persistence
    pub credential_store: CredentialStore,
    /// Linked project id persistence
    pub project_store: ProjectStore,
    /// Valid-access-token orchestration
    pub token_service: TokenService,
    /// Multi-phase setup workflow
    pub provisioner: CloudProvisioner,
    /// Per-user provisioning progress records
    pub progress: Arc<ProgressTracker>,
}

impl ServerResources {
    /// Build all shared resources from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie encryption key is malformed.
    pub fn new(config: ServerConfig, cloud_client: Arc<dyn CloudResourceClient>) -> Result<Self> {
        let cipher = Arc::new(TokenCipher::from_base64(&config.cookie_encryption_key)?);
        let secure = config.secure_cookies;

        let credential_store = CredentialStore::new(cipher.clone(), secure);
        let oauth_client = Arc::new(OAuthClient::new(&config, reqwest::Client::new()));
        let token_service = TokenService::new(credential_store.clone(), oauth_client);

        Ok(Self {
            config: Arc::new(config),
            session_store: SessionStore::new(cipher.clone(), secure),
            credential_store,
            project_store: ProjectStore::new(cipher, secure),
            token_service,
            provisioner: CloudProvisioner::new(cloud_client),
            progress: Arc::new(ProgressTracker::new()),
        })
    }
}
