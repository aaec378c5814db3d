//! Settings loaded from the environment.

use std::env;
use std::net::SocketAddr;

use crate::ServiceError;
use search_sync_shared::types::settings::{DEFAULT_BATCH_SIZE, DEFAULT_INDEX_PREFIX};
use search_sync_shared::{DelegationStrategy, SyncSettings, TypeMapping};

/// Default server host.
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Read the initial `SyncSettings` from the environment.
///
/// # Environment Variables
///
/// - `INDEX_PREFIX`: Index name prefix (default: "wp_")
/// - `BATCH_SIZE`: Items per batch cursor (default: 100)
/// - `INDEXED_TYPES`: JSON array of `{"name": .., "mapping": {..}}` (default: post and page)
/// - `DELEGATION_STRATEGY`: "replace" or "intersect" (default: replace)
pub fn settings_from_env() -> Result<SyncSettings, ServiceError> {
    parse_settings(
        env::var("INDEX_PREFIX").ok(),
        env::var("BATCH_SIZE").ok(),
        env::var("INDEXED_TYPES").ok(),
        env::var("DELEGATION_STRATEGY").ok(),
    )
}

/// Build settings from raw values; `None` selects the default.
pub fn parse_settings(
    index_prefix: Option<String>,
    batch_size: Option<String>,
    indexed_types: Option<String>,
    delegation: Option<String>,
) -> Result<SyncSettings, ServiceError> {
    let batch_size = match batch_size {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| ServiceError::config(format!("Invalid BATCH_SIZE '{}': {}", raw, e)))?,
        None => DEFAULT_BATCH_SIZE,
    };

    let types = match indexed_types {
        Some(raw) => serde_json::from_str::<Vec<TypeMapping>>(&raw)
            .map_err(|e| ServiceError::config(format!("Invalid INDEXED_TYPES: {}", e)))?,
        None => SyncSettings::default().types,
    };

    let delegation = match delegation.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("replace") | Some("replace_entirely") => DelegationStrategy::ReplaceEntirely,
        Some("intersect") => DelegationStrategy::Intersect,
        Some(other) => {
            return Err(ServiceError::config(format!(
                "Invalid DELEGATION_STRATEGY '{}', expected 'replace' or 'intersect'",
                other
            )))
        }
    };

    let settings = SyncSettings {
        index_prefix: index_prefix.unwrap_or_else(|| DEFAULT_INDEX_PREFIX.to_string()),
        batch_size,
        types,
        delegation,
    };

    settings.validate().map_err(ServiceError::config)?;
    Ok(settings)
}

/// Read the listen address from `SERVER_HOST` and `SERVER_PORT`.
pub fn server_addr_from_env() -> Result<SocketAddr, ServiceError> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_SERVER_PORT);

    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| ServiceError::config(format!("Invalid server address: {}", e)))
}
