// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::ServiceError;
pub use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/reindex", post(handlers::reindex_handler))
        .route("/reindex/plan", get(handlers::plan_handler))
        .route("/search", get(handlers::search_handler))
        .route("/settings", put(handlers::import_settings_handler))
        .route("/settings/export", get(handlers::export_settings_handler))
        .route("/settings/reset", post(handlers::reset_settings_handler))
        .layer(create_cors_layer())
        .with_state(state)
}

/// CORS for local admin frontends.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Run the server on the specified address until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServiceError> {
    info!("Server listening on {}", addr);
    info!("- Control endpoint: http://{}/reindex", addr);
    info!("- Search endpoint: http://{}/search", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::server(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Returning here would stop the server immediately.
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
