// ABOUTME: Router assembly and HTTP server startup
// ABOUTME: Merges the route groups and serves with request tracing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cloudsetup Contributors

//! Router assembly and serving

use crate::{
    resources::ServerResources,
    routes::{AuthRoutes, SetupRoutes},
};
use anyhow::Result;
use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Assemble the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    // Request ids are assigned before tracing so every span carries one.
    Router::new()
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(SetupRoutes::routes(resources))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Bind the configured port and serve until shutdown.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(resources: Arc<ServerResources>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "cloudsetup server listening");

    axum::serve(listener, router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received; draining connections");
}
