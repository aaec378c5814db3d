//! Dependency initialization and wiring for the search sync.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::settings::settings_from_env;
use crate::dispatcher::BatchDispatcher;
use crate::indexer::{BatchIndexer, IndexPromoter, TaxonomyIndexer};
use crate::loader::SearchLoader;
use crate::processor::DocumentProcessor;
use crate::query::{ListingExecutor, QueryDelegator};
use crate::ServiceError;
use search_sync_repository::opensearch::IndexConfig;
use search_sync_repository::{
    ConfigContext, ContentRepository, InMemoryConfigContext, OpenSearchProvider,
    PostgresContentRepository, SearchIndexService, SearchIndexServiceConfig,
};
use search_sync_shared::{IndexTarget, SyncSettings};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default bound on one search backend call, in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default bound on one promotion, in seconds.
const DEFAULT_PROMOTION_TIMEOUT_SECS: u64 = 120;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection every retry interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse connection mode from environment variable.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive)
    /// Defaults to "retry" if not set or invalid.
    fn from_env() -> Self {
        match env::var("OPENSEARCH_CONNECTION_MODE")
            .unwrap_or_else(|_| "retry".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub context: Arc<dyn ConfigContext>,
    pub content: Arc<dyn ContentRepository>,
    pub search: Arc<SearchIndexService>,
    pub dispatcher: Arc<BatchDispatcher>,
    pub delegator: Arc<QueryDelegator>,
    pub native: Arc<ListingExecutor>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `SEARCH_REQUEST_TIMEOUT_SECS`: Bound on one backend call (default: 30)
    /// - `SEARCH_PROMOTION_TIMEOUT_SECS`: Bound on one promotion (default: 120)
    /// - `DATABASE_URL`: PostgreSQL URL of the content repository (required)
    /// - settings variables read by `settings_from_env`
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If initialization fails (only in fail-fast mode for OpenSearch)
    pub async fn new() -> Result<Self, ServiceError> {
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ServiceError::config("DATABASE_URL must be set"))?;
        let connection_mode = ConnectionMode::from_env();
        let retry_interval = env::var("OPENSEARCH_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);
        let request_timeout = env::var("SEARCH_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let promotion_timeout = env::var("SEARCH_PROMOTION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PROMOTION_TIMEOUT_SECS);

        let settings = settings_from_env()?;

        info!(
            opensearch_url = %opensearch_url,
            connection_mode = ?connection_mode,
            retry_interval_secs = retry_interval,
            request_timeout_secs = request_timeout,
            promotion_timeout_secs = promotion_timeout,
            index_prefix = %settings.index_prefix,
            batch_size = settings.batch_size,
            types = ?settings.type_names(),
            "Initializing dependencies"
        );

        let content = PostgresContentRepository::connect(&database_url)
            .await
            .map_err(|e| {
                ServiceError::config(format!("Failed to connect to content database: {}", e))
            })?;

        info!("Content repository connected");

        let service_config = SearchIndexServiceConfig::default()
            .with_request_timeout(Duration::from_secs(request_timeout))
            .with_promotion_timeout(Duration::from_secs(promotion_timeout));

        // Exits if the live indices cannot be created in fail-fast mode
        let search = Self::connect_to_opensearch(
            &opensearch_url,
            &settings,
            service_config,
            connection_mode,
            Duration::from_secs(retry_interval),
        )
        .await?;

        info!("OpenSearch connection established");

        Ok(Self::from_components(
            Arc::new(InMemoryConfigContext::new(settings)),
            Arc::new(content),
            search,
        ))
    }

    /// Wire the core components over already-built collaborators.
    pub fn from_components(
        context: Arc<dyn ConfigContext>,
        content: Arc<dyn ContentRepository>,
        search: SearchIndexService,
    ) -> Self {
        let search = Arc::new(search);
        let processor = DocumentProcessor::new();
        let loader = Arc::new(SearchLoader::new(search.clone()));

        let dispatcher = BatchDispatcher::new(
            context.clone(),
            search.clone(),
            BatchIndexer::new(content.clone(), processor.clone(), loader.clone()),
            TaxonomyIndexer::new(content.clone(), processor, loader),
            IndexPromoter::new(search.clone()),
        );

        Self {
            delegator: Arc::new(QueryDelegator::new(search.clone(), content.clone())),
            native: Arc::new(ListingExecutor::new(content.clone())),
            dispatcher: Arc::new(dispatcher),
            context,
            content,
            search,
        }
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        settings: &SyncSettings,
        service_config: SearchIndexServiceConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<SearchIndexService, ServiceError> {
        loop {
            match Self::try_connect_opensearch(url, settings, service_config.clone()).await {
                Ok(service) => return Ok(service),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(ServiceError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch and make sure every live index exists.
    async fn try_connect_opensearch(
        url: &str,
        settings: &SyncSettings,
        service_config: SearchIndexServiceConfig,
    ) -> Result<SearchIndexService, ServiceError> {
        let provider = OpenSearchProvider::new(url, IndexConfig::default())
            .await
            .map_err(|e| {
                ServiceError::config(format!("Failed to create OpenSearch provider: {}", e))
            })?;

        let service = SearchIndexService::with_config(Box::new(provider), service_config);

        let targets: Vec<IndexTarget> = settings
            .type_names()
            .into_iter()
            .map(IndexTarget::ContentType)
            .chain([IndexTarget::Taxonomies])
            .collect();

        service
            .handle_index_creation(&settings.index_prefix, &targets)
            .await
            .map_err(|e| ServiceError::config(format!("Failed to ensure live indices exist: {}", e)))?;

        Ok(service)
    }
}
