// ABOUTME: Library entry point for the credential lifecycle and provisioning backend
// ABOUTME: Encrypted OAuth token storage, proactive refresh, and polled setup workflows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! # Cloudsetup Server
//!
//! The credential lifecycle and cloud-resource provisioning core of the
//! surrounding web application. It encrypts and persists OAuth-derived token
//! sets, refreshes access tokens before expiry, classifies every failure
//! through a structured error taxonomy, and drives a multi-phase cloud
//! project setup workflow that clients observe by polling.

/// Environment-driven configuration
pub mod config;
/// Authenticated encryption for credential payloads
pub mod crypto;
/// Structured error taxonomy
pub mod errors;
/// Structured logging setup
pub mod logging;
/// Core data transfer types
pub mod models;
/// Token expiry checks and the refresh-token grant
pub mod oauth;
/// Cloud project provisioning workflow
pub mod provisioning;
/// Shared server resources
pub mod resources;
/// HTTP boundary handlers
pub mod routes;
/// Cookie handling and log redaction
pub mod security;
/// Router assembly and serving
pub mod server;
/// Encrypted cookie-backed stores
pub mod store;
