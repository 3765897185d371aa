//! Vigil API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vigil_common::config::AppConfig;

use vigil_api::routes::create_router;
use vigil_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("vigil_api=debug,vigil_notifier=debug,vigil_engine=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting Vigil API server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let port = config.api_port;

    // Build application state and launch the dispatch loop
    let state = AppState::new(config);
    state.dispatcher.start();
    let dispatcher = Arc::clone(&state.dispatcher);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let queued work settle before exit
    dispatcher.stop().await;
    tracing::info!("Vigil API server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Received shutdown signal, stopping gracefully...");
}
