// ABOUTME: Server binary wiring logging, configuration, and resources together
// ABOUTME: Fails fast on missing configuration before binding the listener
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Cloudsetup server binary

use anyhow::Result;
use cloudsetup_server::{
    config::ServerConfig, logging, provisioning::StubCloudClient, resources::ServerResources,
    server,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let config = ServerConfig::from_env()?;
    tracing::info!(
        port = config.http_port,
        oauth_client_configured = config.has_oauth_client(),
        "configuration loaded"
    );

    let resources = Arc::new(ServerResources::new(
        config,
        Arc::new(StubCloudClient::default()),
    )?);

    server::serve(resources).await
}
