// ABOUTME: Core data transfer types for the credential and provisioning subsystem
// ABOUTME: Defines TokenSet and the validated Session decoded at the HTTP boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Core data models

use serde::{Deserialize, Serialize};

/// One user's third-party API credentials: access token, optional refresh
/// token, and the access token's expiry as unix seconds.
///
/// Owned exclusively by one user identity; stored encrypted and never logged
/// in plaintext. Mutated only by the refresh engine (access token and expiry
/// replaced, refresh token preserved) or deleted wholesale on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Short-lived bearer token for the third-party API
    pub access_token: String,
    /// Long-lived token exchanged for new access tokens; not always issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry, unix seconds
    pub expires_at: i64,
}

/// Authenticated session established by the identity-provider sign-in flow.
///
/// Decoded from an encrypted session cookie and validated at the boundary;
/// required fields are enforced here rather than carried as an untyped map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable user identity key; owns the credential and progress records
    pub user_id: String,
    /// Email used to derive cloud project identifiers
    pub email: String,
    /// Display name, if the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
