// ABOUTME: Security utilities for cookie handling and log redaction
// ABOUTME: Keeps credential material out of logs, error details, and response metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Security helpers shared across the credential and provisioning subsystem

/// Cookie parsing and Set-Cookie construction
pub mod cookies;
/// Sensitive-field redaction for logs and error details
pub mod redaction;
