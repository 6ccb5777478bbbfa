// ABOUTME: HTTP cookie parsing and Set-Cookie construction for credential storage
// ABOUTME: Builds HTTP-only, SameSite=Lax cookies with Secure toggled per environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Cookie helpers for the encrypted credential stores
//!
//! The stores persist opaque encrypted blobs as HTTP-only cookies. The outer
//! cookie lifetime bounds how long a refresh token may be used; the inner
//! token expiry is tracked separately inside the encrypted payload.

use crate::errors::{AppError, AppResult};
use http::{HeaderMap, HeaderValue};

/// Outer cookie lifetime in seconds (30 days)
pub const COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Extract a cookie value from a request header map
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(http::header::COOKIE)?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// Build a `Set-Cookie` header value for an opaque blob.
///
/// Always `HttpOnly; SameSite=Lax; Path=/`; `Secure` is appended when the
/// server runs in production.
///
/// # Errors
/// Returns a `Database` error if the assembled cookie is not a valid header
/// value (only possible with a malformed blob).
pub fn build_cookie(name: &str, value: &str, secure: bool) -> AppResult<HeaderValue> {
    let mut cookie = format!(
        "{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::database(format!("Invalid cookie value for {name}: {e}")))
}

/// Build a `Set-Cookie` header value that removes the named cookie
#[must_use]
pub fn expire_cookie(name: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }

    // Name is a compile-time constant in all call sites; the static fallback
    // only guards against a non-ASCII name sneaking in.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            "theme=dark; cs_token=abc123; lang=en".parse().unwrap(),
        );

        assert_eq!(
            get_cookie_value(&headers, "cs_token"),
            Some("abc123".to_owned())
        );
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn secure_flag_only_in_production() {
        let dev = build_cookie("cs_token", "blob", false).unwrap();
        assert!(!dev.to_str().unwrap().contains("Secure"));

        let prod = build_cookie("cs_token", "blob", true).unwrap();
        assert!(prod.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn expired_cookie_clears_value() {
        let cleared = expire_cookie("cs_token", false);
        let text = cleared.to_str().unwrap();
        assert!(text.starts_with("cs_token=;"));
        assert!(text.contains("Max-Age=0"));
    }
}
