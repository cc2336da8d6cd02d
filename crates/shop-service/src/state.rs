//! Application state.

use std::sync::Arc;

use shop_engine::SettlementEngine;
use shop_store::Store;

use crate::config::ServiceConfig;
use crate::worker::{self, WorkerHandle};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// The settlement engine.
    pub engine: Arc<SettlementEngine>,

    /// Handle to the background refund worker.
    pub worker: WorkerHandle,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create the application state and spawn the refund worker.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let engine = Arc::new(SettlementEngine::new(
            Arc::clone(&store),
            config.settlement(),
        ));
        let worker = worker::spawn(Arc::clone(&engine));

        Self {
            store,
            engine,
            worker,
            config,
        }
    }
}
