// ABOUTME: Cryptography module for authenticated encryption of credential payloads
// ABOUTME: Centralizes the AEAD cipher used by the cookie-backed stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Authenticated encryption for credential payloads

/// AES-256-GCM cipher for opaque cookie blobs
pub mod cipher;

pub use cipher::TokenCipher;
