// ABOUTME: Unified error taxonomy for the credential and provisioning subsystem
// ABOUTME: Maps categorized errors to HTTP statuses and safe user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! # Unified Error Handling System
//!
//! Every failure that crosses this crate's boundary is an [`AppError`] with a
//! fixed [`ErrorCategory`]. The category determines both the HTTP status
//! mapping and the user-facing message; raw internal messages are logged
//! server-side and never returned to clients.

use crate::security::redaction;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Fixed set of error categories used to classify every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Invalid or expired credentials, missing OAuth client configuration
    #[serde(rename = "AUTHENTICATION")]
    Authentication,
    /// Insufficient permission for the requested action
    #[serde(rename = "AUTHORIZATION")]
    Authorization,
    /// Malformed input, e.g. a malformed cloud project identifier
    #[serde(rename = "VALIDATION")]
    Validation,
    /// Non-ok response from an external HTTP call
    #[serde(rename = "API")]
    Api,
    /// Storage operation failure
    #[serde(rename = "DATABASE")]
    Database,
    /// Transport-level failure reaching an external service
    #[serde(rename = "NETWORK")]
    Network,
    /// Any foreign failure wrapped at the subsystem boundary
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ErrorCategory {
    /// Default HTTP status code for this category
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::Authorization => 403,
            Self::Validation => 400,
            Self::Network => 503,
            Self::Api | Self::Database | Self::Unknown => 500,
        }
    }

    /// Generic safe-to-display message for this category
    #[must_use]
    pub const fn generic_message(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication required. Please sign in again.",
            Self::Authorization => "You do not have permission to perform this action.",
            Self::Validation => "The provided input is invalid.",
            Self::Api => "An external service request failed. Please try again.",
            Self::Database => "A storage operation failed. Please try again.",
            Self::Network => "A network error occurred. Please try again.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::Validation => "VALIDATION",
            Self::Api => "API",
            Self::Database => "DATABASE",
            Self::Network => "NETWORK",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Categorized application error, immutable once constructed
#[derive(Debug, Error)]
#[error("[{category}] {message}")]
pub struct AppError {
    /// Error category driving status mapping and user messaging
    pub category: ErrorCategory,
    /// Internal message, logged server-side only
    pub message: String,
    /// Explicit HTTP status override (e.g. propagated from an external API)
    pub status_code: Option<u16>,
    /// Additional non-sensitive context attached at construction
    pub details: Option<serde_json::Value>,
}

/// Result type alias for fallible operations in this crate
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new error with the given category and message
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            status_code: None,
            details: None,
        }
    }

    /// Invalid or expired credentials (401)
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Authentication, message)
    }

    /// Insufficient permission (403)
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Authorization, message)
    }

    /// Malformed input (400); the message is shown to the user verbatim
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, message)
    }

    /// External API failure, optionally propagating the upstream status
    pub fn api(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            category: ErrorCategory::Api,
            message: message.into(),
            status_code,
            details: None,
        }
    }

    /// Storage failure (500)
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Database, message)
    }

    /// Transport failure (503)
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    /// Wrapped foreign failure (500)
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unknown, message)
    }

    /// Attach additional non-sensitive context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Effective HTTP status: explicit override or the category default
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.status_code.unwrap_or_else(|| self.category.http_status())
    }

    /// Category-specific message that is safe to display to a user.
    ///
    /// Validation errors pass their own message through verbatim; every
    /// other category returns generic text so internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.category {
            ErrorCategory::Validation => self.message.clone(),
            _ => self.category.generic_message().to_owned(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<Self>() {
            Ok(app_error) => app_error,
            Err(other) => Self::unknown(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        Self::network(format!("HTTP transport error: {error}"))
    }
}

/// Uniform wrapper for fallible operations crossing into the subsystem.
///
/// An [`AppError`] (possibly buried in an `anyhow::Error`) passes through
/// unchanged after being logged; any other failure is normalized into an
/// [`AppError`] of the supplied category carrying the source error's
/// message.
pub trait WrapErr<T> {
    /// Log and normalize the error, tagging it with module/method context
    ///
    /// # Errors
    /// Returns the original `AppError`, or a new one of `category` wrapping
    /// any other failure.
    fn wrap_err(self, category: ErrorCategory, module: &str, method: &str) -> AppResult<T>;
}

impl<T, E: Into<anyhow::Error>> WrapErr<T> for Result<T, E> {
    fn wrap_err(self, category: ErrorCategory, module: &str, method: &str) -> AppResult<T> {
        self.map_err(|error| {
            let error: anyhow::Error = error.into();
            match error.downcast::<AppError>() {
                Ok(app_error) => {
                    tracing::error!(module, method, error = %app_error, "operation failed");
                    app_error
                }
                Err(other) => {
                    tracing::error!(module, method, error = %other, "operation failed");
                    AppError::new(category, other.to_string())
                }
            }
        })
    }
}

/// Translate an external HTTP response into either its parsed body or an
/// [`ErrorCategory::Api`] error.
///
/// On a non-success status the JSON error body's `message` (or `error`)
/// field becomes the error message, falling back to a generic
/// `API error: <status> <reason>` line when the body is not valid JSON.
/// Response metadata is attached with `authorization`, `cookie` and
/// `set-cookie` headers always stripped.
///
/// # Errors
/// Returns an `Api` error for non-success statuses, and a distinct
/// "Failed to parse API response" error when an ok body cannot be decoded.
pub async fn handle_api_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    let url = response.url().to_string();

    if !status.is_success() {
        let headers = redaction::redact_header_map(response.headers());
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| {
                format!(
                    "API error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });

        return Err(AppError::api(message, Some(status.as_u16())).with_details(json!({
            "status": status.as_u16(),
            "url": url,
            "headers": headers,
        })));
    }

    response.json::<T>().await.map_err(|error| {
        AppError::api("Failed to parse API response", None).with_details(json!({
            "url": url,
            "parse_error": error.to_string(),
        }))
    })
}

/// HTTP error response body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Safe user-facing message
    pub error: String,
    /// Error category name
    pub category: ErrorCategory,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            category = %self.category,
            status = self.http_status(),
            message = %self.message,
            "request failed"
        );

        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.user_message(),
            category: self.category,
        };

        (status, Json(body)).into_response()
    }
}
