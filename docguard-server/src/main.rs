//! Docguard Server - REST API for checked document and photo uploads
//!
//! Exposes docguard-core via HTTP endpoints:
//! - POST /zones/{zone}/files - Check and store a batch of files
//! - GET /zones/{zone} - List accepted files
//! - GET /events - Recent pipeline events

use std::net::SocketAddr;

use docguard_server::{create_router_with_config, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docguard_server=info,docguard_core=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let addr = config.socket_addr();

    tracing::info!(
        max_files_per_zone = config.max_files_per_zone,
        max_file_size_mb = config.max_file_size_mb,
        accepted = ?config.accepted_mime_patterns,
        "Upload policy loaded"
    );

    let app = create_router_with_config(&config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
