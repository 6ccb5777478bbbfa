// ABOUTME: Cloud project identifier generation and format validation
// ABOUTME: Derives deterministic-but-unique ids from user emails within platform grammar
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Project identifier grammar and generation
//!
//! Target platform grammar: 6-30 characters, lowercase letters, digits and
//! hyphens, starting with a letter and not ending with a hyphen.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum project id length
pub const PROJECT_ID_MIN_LEN: usize = 6;
/// Maximum project id length
pub const PROJECT_ID_MAX_LEN: usize = 30;

/// Outcome of validating a candidate project identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdValidation {
    /// Whether the id is usable
    pub valid: bool,
    /// User-facing reason when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Individual grammar rules violated, when the format is at fault
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ProjectIdValidation {
    /// A usable id
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            message: None,
            details: None,
        }
    }

    /// Malformed id with the violated rules listed
    #[must_use]
    pub fn invalid_format(details: Vec<String>) -> Self {
        Self {
            valid: false,
            message: Some("Invalid Project ID format".into()),
            details: Some(details),
        }
    }

    /// Well-formed id whose project has billing disabled
    #[must_use]
    pub fn billing_disabled() -> Self {
        Self {
            valid: false,
            message: Some("Billing is not enabled for this project".into()),
            details: None,
        }
    }
}

/// Grammar rules violated by a candidate id; empty means well-formed
#[must_use]
pub fn format_violations(id: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if id.len() < PROJECT_ID_MIN_LEN || id.len() > PROJECT_ID_MAX_LEN {
        violations.push(format!(
            "must be {PROJECT_ID_MIN_LEN} to {PROJECT_ID_MAX_LEN} characters"
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        violations.push("may contain only lowercase letters, digits, and hyphens".into());
    }
    if !id.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        violations.push("must start with a lowercase letter".into());
    }
    if id.ends_with('-') {
        violations.push("cannot end with a hyphen".into());
    }

    violations
}

/// Whether a candidate id satisfies the platform grammar
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    format_violations(id).is_empty()
}

/// Derive a project id from a user's email.
///
/// The local part is sanitized to the platform grammar and suffixed with a
/// random+time component to avoid collisions, then truncated to the length
/// limit. The result always satisfies [`is_well_formed`].
#[must_use]
pub fn generate_project_id(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or(email);

    let mut base = String::with_capacity(local_part.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for c in local_part.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            base.push(c);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            base.push('-');
            last_was_hyphen = true;
        }
    }
    let base = base.trim_matches('-');

    let mut candidate = if base.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        base.to_owned()
    } else if base.is_empty() {
        "proj".to_owned()
    } else {
        format!("proj-{base}")
    };

    // time + randomness: unique across runs, still recognizably derived
    let suffix = format!(
        "{:x}-{:04x}",
        chrono::Utc::now().timestamp() & 0xff_ffff,
        rand::thread_rng().gen::<u16>()
    );

    let max_base_len = PROJECT_ID_MAX_LEN - suffix.len() - 1;
    if candidate.len() > max_base_len {
        candidate.truncate(max_base_len);
    }
    let candidate = candidate.trim_end_matches('-');

    format!("{candidate}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_well_formed() {
        for email in [
            "ana@example.com",
            "First.Last+tag@corp.example",
            "UPPER_case!!@x.io",
            "@nodomain",
            "a-very-long-local-part-that-overflows-the-limit@example.com",
        ] {
            let id = generate_project_id(email);
            assert!(
                is_well_formed(&id),
                "id {id:?} from {email:?} violates: {:?}",
                format_violations(&id)
            );
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = generate_project_id("ana@example.com");
        let second = generate_project_id("ana@example.com");
        assert_ne!(first, second);
    }

    #[test]
    fn generated_ids_keep_the_email_stem() {
        let id = generate_project_id("ana@example.com");
        assert!(id.starts_with("ana-"));
    }

    #[test]
    fn short_id_violates_length_rule() {
        let violations = format_violations("bad");
        assert!(violations.iter().any(|v| v.contains("6 to 30")));
    }

    #[test]
    fn grammar_violations_are_itemized() {
        let violations = format_violations("9Bad_Id-");
        assert!(violations.iter().any(|v| v.contains("lowercase letters, digits")));
        assert!(violations.iter().any(|v| v.contains("start with a lowercase letter")));
        assert!(violations.iter().any(|v| v.contains("end with a hyphen")));
    }

    #[test]
    fn well_formed_id_passes() {
        assert!(is_well_formed("my-project-123"));
        assert!(format_violations("my-project-123").is_empty());
    }
}
