// ABOUTME: Multi-phase cloud project setup workflow behind a provider trait seam
// ABOUTME: Sequential creating/billing/api phases with fail-stop and per-phase progress snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Setup workflow and the cloud client seam
//!
//! Real project creation, billing activation, and API enablement sit behind
//! [`CloudResourceClient`]; the bundled [`StubCloudClient`] stands in for a
//! real IAM/resource-manager integration with artificial latency.

use super::{project_id, ProjectIdValidation, SetupPhase, SetupProgress};
use crate::errors::AppResult;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Operations a real cloud resource-manager client would expose
#[async_trait]
pub trait CloudResourceClient: Send + Sync {
    /// Project ids the user already owns
    ///
    /// # Errors
    /// Returns an error on transport failure; callers treat that as "assume
    /// none exist".
    async fn list_projects(&self, access_token: &str) -> AppResult<Vec<String>>;

    /// Create a project with the given id
    ///
    /// # Errors
    /// Returns an error when creation fails.
    async fn create_project(&self, access_token: &str, project_id: &str) -> AppResult<()>;

    /// Link the billing account to the project
    ///
    /// # Errors
    /// Returns an error when billing activation fails.
    async fn enable_billing(&self, access_token: &str, project_id: &str) -> AppResult<()>;

    /// Enable the APIs the application depends on
    ///
    /// # Errors
    /// Returns an error when API enablement fails.
    async fn enable_required_apis(&self, access_token: &str, project_id: &str) -> AppResult<()>;

    /// Whether billing is active for an existing project
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn billing_enabled(&self, access_token: &str, project_id: &str) -> AppResult<bool>;
}

/// Stand-in cloud client with artificial per-phase latency.
///
/// Project ids starting with `no-billing` report billing as disabled.
pub struct StubCloudClient {
    phase_delay: Duration,
}

impl StubCloudClient {
    /// Client with the given artificial latency per phase
    #[must_use]
    pub const fn new(phase_delay: Duration) -> Self {
        Self { phase_delay }
    }
}

impl Default for StubCloudClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[async_trait]
impl CloudResourceClient for StubCloudClient {
    async fn list_projects(&self, _access_token: &str) -> AppResult<Vec<String>> {
        tokio::time::sleep(self.phase_delay).await;
        Ok(Vec::new())
    }

    async fn create_project(&self, _access_token: &str, project_id: &str) -> AppResult<()> {
        tokio::time::sleep(self.phase_delay).await;
        tracing::info!(project_id, "stub: created project");
        Ok(())
    }

    async fn enable_billing(&self, _access_token: &str, project_id: &str) -> AppResult<()> {
        tokio::time::sleep(self.phase_delay).await;
        tracing::info!(project_id, "stub: linked billing account");
        Ok(())
    }

    async fn enable_required_apis(&self, _access_token: &str, project_id: &str) -> AppResult<()> {
        tokio::time::sleep(self.phase_delay).await;
        tracing::info!(project_id, "stub: enabled required APIs");
        Ok(())
    }

    async fn billing_enabled(&self, _access_token: &str, project_id: &str) -> AppResult<bool> {
        tokio::time::sleep(self.phase_delay).await;
        Ok(!project_id.starts_with("no-billing"))
    }
}

/// Inputs for one provisioning run
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Owner of the run and its progress record
    pub user_id: String,
    /// Email the project id is derived from
    pub email: String,
    /// Access token for the cloud API calls
    pub access_token: String,
}

/// Drives the multi-phase setup workflow against a [`CloudResourceClient`]
#[derive(Clone)]
pub struct CloudProvisioner {
    client: Arc<dyn CloudResourceClient>,
}

impl CloudProvisioner {
    /// Provisioner over the given cloud client
    #[must_use]
    pub fn new(client: Arc<dyn CloudResourceClient>) -> Self {
        Self { client }
    }

    /// Project ids the user already owns; transport failure reads as "none",
    /// so a transient provider hiccup cannot stall the workflow.
    pub async fn get_existing_projects(&self, access_token: &str) -> Vec<String> {
        match self.client.list_projects(access_token).await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "listing projects failed; assuming none exist");
                Vec::new()
            }
        }
    }

    /// Run the setup workflow, invoking `on_progress` with a full snapshot
    /// after every phase transition.
    ///
    /// An existing project short-circuits straight to `complete`. Otherwise
    /// the phases run strictly sequentially; the first failure transitions
    /// to `failed` with the triggering error attached and the remaining
    /// phases never run. Phases are not retried; the caller restarts setup.
    pub async fn setup_project<F>(&self, options: &SetupOptions, on_progress: F) -> SetupProgress
    where
        F: Fn(SetupProgress) + Send + Sync,
    {
        let existing = self.get_existing_projects(&options.access_token).await;
        if let Some(project_id) = existing.first() {
            tracing::info!(user_id = %options.user_id, project_id, "reusing existing project");
            let done = SetupProgress::complete(project_id, "Using existing project");
            on_progress(done.clone());
            return done;
        }

        let project_id = project_id::generate_project_id(&options.email);
        tracing::info!(user_id = %options.user_id, project_id, "starting project setup");

        let phases: [(SetupPhase, &str); 3] = [
            (SetupPhase::Creating, "Creating project"),
            (SetupPhase::Billing, "Linking billing account"),
            (SetupPhase::Api, "Enabling required APIs"),
        ];

        for (phase, message) in phases {
            let snapshot = SetupProgress::phase(phase, message, Some(project_id.clone()));
            on_progress(snapshot);

            let result = match phase {
                SetupPhase::Creating => {
                    self.client
                        .create_project(&options.access_token, &project_id)
                        .await
                }
                SetupPhase::Billing => {
                    self.client
                        .enable_billing(&options.access_token, &project_id)
                        .await
                }
                SetupPhase::Api => {
                    self.client
                        .enable_required_apis(&options.access_token, &project_id)
                        .await
                }
                // Terminal phases are never dispatched as work items.
                SetupPhase::Pending | SetupPhase::Complete | SetupPhase::Failed => Ok(()),
            };

            if let Err(e) = result {
                tracing::error!(
                    user_id = %options.user_id,
                    project_id,
                    phase = ?phase,
                    error = %e,
                    "project setup failed"
                );
                let failed = SetupProgress::failed(Some(project_id), e.message);
                on_progress(failed.clone());
                return failed;
            }
        }

        tracing::info!(user_id = %options.user_id, project_id, "project setup complete");
        let done = SetupProgress::complete(project_id, "Project setup complete");
        on_progress(done.clone());
        done
    }

    /// Validate a candidate project id: grammar first, then billing status.
    ///
    /// # Errors
    /// Propagates transport failures from the billing lookup.
    pub async fn validate_project_id(
        &self,
        access_token: &str,
        candidate: &str,
    ) -> AppResult<ProjectIdValidation> {
        let violations = project_id::format_violations(candidate);
        if !violations.is_empty() {
            return Ok(ProjectIdValidation::invalid_format(violations));
        }

        if !self.client.billing_enabled(access_token, candidate).await? {
            return Ok(ProjectIdValidation::billing_disabled());
        }

        Ok(ProjectIdValidation::ok())
    }
}
