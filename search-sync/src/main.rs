//! Search Sync Main Entry Point
//!
//! Serves the control, search, and settings endpoints of the search sync.

use dotenv::dotenv;
use search_sync::config::server_addr_from_env;
use search_sync::server::{create_app, run_server, AppState};
use search_sync::{Dependencies, ServiceError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("search_sync=info,search_sync_repository=info"));

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| ServiceError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "search-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| ServiceError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "search-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting search sync");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let addr = server_addr_from_env()?;
    let app = create_app(AppState::from(deps));

    match run_server(app, addr).await {
        Ok(()) => {
            info!("Search sync stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search sync server failed");
            Err(e)
        }
    }
}
