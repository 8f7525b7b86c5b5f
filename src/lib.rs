// Tournament progression and scoring engine.

pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod http;
mod middleware;
pub use middleware::cors_layer;
pub mod models;
pub mod state;
pub mod ws;

use axum::Router;
use state::AppState;
use std::net::SocketAddr;
use tokio::signal;

/// Start the HTTP API server
pub async fn start_server() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = state::AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let allowed_origins = config.allowed_origins.clone();

    // Initialize application state (runs migrations, establishes the pool)
    let state = AppState::new(config)
        .await
        .expect("Failed to initialize application state");

    tracing::info!("PostgreSQL connection pool established");

    // Build HTTP router
    let app = Router::new()
        .merge(http::create_http_routes(state.clone()))
        // WebSocket routes (tournament/lobby real-time events)
        .merge(ws::create_ws_routes(state.clone()))
        .layer(cors_layer(&allowed_origins))
        .fallback(|| async { "404 Not Found" });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Server listening on {}", bind_addr);

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }
}

/// Handle graceful shutdown on SIGTERM or Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, shutting down");
        },
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down");
        },
    }
}
