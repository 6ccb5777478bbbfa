// ABOUTME: Provisioning state machine types and the shared progress tracker
// ABOUTME: Whole-record replacement per user id so polling readers never see torn state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! # Cloud Resource Provisioning Workflow
//!
//! A provisioning run walks `pending → creating → billing → api → complete`,
//! with `failed` reachable from any non-terminal phase. The run executes
//! detached from its triggering request and communicates solely through the
//! [`ProgressTracker`], which a polling client reads.

/// Project identifier generation and validation
pub mod project_id;
/// The multi-phase setup workflow and the cloud client seam
pub mod workflow;

pub use project_id::{generate_project_id, ProjectIdValidation};
pub use workflow::{CloudProvisioner, CloudResourceClient, SetupOptions, StubCloudClient};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Non-terminal records older than this are treated as implicitly failed;
/// the provisioning process may have died without reporting.
pub const STALE_AFTER_SECS: i64 = 600;

/// Phase of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupPhase {
    /// Run accepted, not yet started
    Pending,
    /// Creating the cloud project
    Creating,
    /// Linking the billing account
    Billing,
    /// Enabling required APIs
    Api,
    /// Terminal: project ready
    Complete,
    /// Terminal: run aborted; `error` carries the trigger
    Failed,
}

impl SetupPhase {
    /// Whether this phase ends the run
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Snapshot of a provisioning run, polled by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupProgress {
    /// Current phase
    pub status: SetupPhase,
    /// Human-readable progress line
    pub message: String,
    /// Project id once chosen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Triggering error message when `status` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last transition time, unix seconds
    pub updated_at: i64,
}

impl SetupProgress {
    /// Fresh record for an accepted run
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: SetupPhase::Pending,
            message: "Project setup queued".into(),
            project_id: None,
            error: None,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Snapshot for a non-terminal phase transition
    #[must_use]
    pub fn phase(status: SetupPhase, message: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            project_id,
            error: None,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Terminal success snapshot
    #[must_use]
    pub fn complete(project_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: SetupPhase::Complete,
            message: message.into(),
            project_id: Some(project_id.into()),
            error: None,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Terminal failure snapshot carrying the triggering error
    #[must_use]
    pub fn failed(project_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            status: SetupPhase::Failed,
            message: "Project setup failed".into(),
            project_id,
            error: Some(error.into()),
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether this record has gone stale without reaching a terminal phase
    #[must_use]
    pub fn is_stale(&self, now: i64) -> bool {
        !self.status.is_terminal() && now - self.updated_at > STALE_AFTER_SECS
    }
}

/// Per-user progress records, the only mutable shared state in the crate.
///
/// Every write replaces the whole record; fields are never mutated in place,
/// so a concurrent reader observes either the old or the new snapshot but
/// never a torn one.
#[derive(Default)]
pub struct ProgressTracker {
    records: DashMap<String, SetupProgress>,
}

impl ProgressTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for a user with a new snapshot
    pub fn put(&self, user_id: &str, progress: SetupProgress) {
        tracing::debug!(user_id, status = ?progress.status, "progress update");
        self.records.insert(user_id.to_owned(), progress);
    }

    /// Current record for a user, with stale non-terminal records
    /// force-transitioned to `failed`.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<SetupProgress> {
        let current = self.records.get(user_id).map(|entry| entry.clone())?;

        if current.is_stale(chrono::Utc::now().timestamp()) {
            tracing::warn!(user_id, "stale provisioning record; marking failed");
            let failed = SetupProgress::failed(
                current.project_id,
                "Setup timed out without reporting progress",
            );
            self.records.insert(user_id.to_owned(), failed.clone());
            return Some(failed);
        }

        Some(current)
    }

    /// Discard any record for a user; a new run supersedes the old one
    pub fn clear(&self, user_id: &str) {
        self.records.remove(user_id);
    }
}
