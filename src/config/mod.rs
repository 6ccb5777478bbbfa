// ABOUTME: Configuration module for environment-driven server settings
// ABOUTME: Loads OAuth client credentials, encryption key, and runtime options once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Configuration management

/// Environment-variable driven server configuration
pub mod environment;

pub use environment::ServerConfig;
