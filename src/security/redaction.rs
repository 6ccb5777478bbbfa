// ABOUTME: Redaction helpers that strip credential material before logging
// ABOUTME: Replaces token, password, and secret shaped fields with a placeholder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Redaction of sensitive data before it reaches logs or error details
//!
//! Token sets are never logged in plaintext: any JSON structure derived from
//! credential material goes through [`redact_sensitive`] first, and HTTP
//! response metadata attached to errors goes through [`redact_header_map`].

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Replacement string for redacted values
pub const REDACTION_PLACEHOLDER: &str = "[REDACTED]";

/// Headers that are always stripped from logged/attached response metadata
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

fn sensitive_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Matches accessToken/access_token, refreshToken, password, secret,
        // and api-key shaped field names, case-insensitively.
        #[allow(clippy::unwrap_used)] // Safe: pattern is a compile-time constant
        Regex::new(r"(?i)(access[_-]?token|refresh[_-]?token|password|secret|api[_-]?key)")
            .unwrap()
    })
}

/// Whether a JSON field name holds credential material
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    sensitive_key_pattern().is_match(key)
}

/// Recursively replace values of sensitive fields with the placeholder
pub fn redact_sensitive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *entry = Value::String(REDACTION_PLACEHOLDER.to_owned());
                } else {
                    redact_sensitive(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_sensitive(item);
            }
        }
        _ => {}
    }
}

/// Copy of a header map safe to attach to error details.
///
/// `authorization`, `cookie` and `set-cookie` are dropped entirely; other
/// values that fail to decode as UTF-8 are replaced with the placeholder.
#[must_use]
pub fn redact_header_map(headers: &http::HeaderMap) -> serde_json::Map<String, Value> {
    let mut safe = serde_json::Map::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if SENSITIVE_HEADERS.contains(&name_str) {
            continue;
        }
        let value_str = value
            .to_str()
            .map_or_else(|_| REDACTION_PLACEHOLDER.to_owned(), str::to_owned);
        safe.insert(name_str.to_owned(), Value::String(value_str));
    }
    safe
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_token_fields_at_any_depth() {
        let mut value = json!({
            "user": "ana@example.com",
            "accessToken": "ya29.secret",
            "nested": {
                "refresh_token": "1//abc",
                "expires_at": 1_700_000_000,
            },
            "history": [{"password": "hunter2"}],
        });

        redact_sensitive(&mut value);

        assert_eq!(value["accessToken"], REDACTION_PLACEHOLDER);
        assert_eq!(value["nested"]["refresh_token"], REDACTION_PLACEHOLDER);
        assert_eq!(value["history"][0]["password"], REDACTION_PLACEHOLDER);
        assert_eq!(value["user"], "ana@example.com");
        assert_eq!(value["nested"]["expires_at"], 1_700_000_000);
    }

    #[test]
    fn strips_credential_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        headers.insert("cookie", "session=xyz".parse().unwrap());
        headers.insert("set-cookie", "session=xyz".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let safe = redact_header_map(&headers);

        assert!(!safe.contains_key("authorization"));
        assert!(!safe.contains_key("cookie"));
        assert!(!safe.contains_key("set-cookie"));
        assert_eq!(safe["content-type"], "application/json");
    }
}
