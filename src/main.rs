//! docs-gateway: service entry point.
//!
//! Wires configuration, the backend client, the tool registry and the
//! HTTP router together, then serves until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docs_gateway::{
    AppState, GatewayConfig, SearchBackend, SearchDocsTool, SearchGateway, ToolRegistry,
    create_router,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("starting docs-gateway v{}", docs_gateway::VERSION);

    let config = GatewayConfig::from_env()?;
    config.validate()?;
    info!(
        backend = %config.backend.base_url,
        index = %config.backend.index_id,
        "configuration loaded"
    );

    let backend = SearchBackend::new(&config.backend)?;
    let gateway = Arc::new(SearchGateway::new(backend));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchDocsTool::new(gateway)));

    let state = AppState::new(&config, Arc::new(registry));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
