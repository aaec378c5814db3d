// App state for Axum server
use std::sync::Arc;

use crate::config::Dependencies;
use crate::dispatcher::BatchDispatcher;
use crate::query::{ListingExecutor, QueryDelegator};
use search_sync_repository::{ConfigContext, ContentRepository};

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<dyn ConfigContext>,
    pub content: Arc<dyn ContentRepository>,
    pub dispatcher: Arc<BatchDispatcher>,
    pub delegator: Arc<QueryDelegator>,
    pub native: Arc<ListingExecutor>,
}

impl From<Dependencies> for AppState {
    fn from(deps: Dependencies) -> Self {
        Self {
            context: deps.context,
            content: deps.content,
            dispatcher: deps.dispatcher,
            delegator: deps.delegator,
            native: deps.native,
        }
    }
}
