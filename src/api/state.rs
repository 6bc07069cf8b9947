use std::sync::Arc;

use crate::application::{
    AskService, RetrievalRouter, SessionHistoryService, StoreRegistry,
};
use crate::domain::ports::{AnswerGenerator, EmbeddingService, SessionHistory};
use crate::infrastructure::AppConfig;

/// Everything a request handler may touch. Built once at startup; the
/// registry inside never changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub ask: Arc<AskService>,
    pub history: Arc<SessionHistoryService>,
    pub registry: Arc<StoreRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: StoreRegistry,
        history: Arc<dyn SessionHistory>,
        embedding: Arc<dyn EmbeddingService>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        let registry = Arc::new(registry);
        let history = Arc::new(SessionHistoryService::new(history, config.history.window));
        let router = RetrievalRouter::new(registry.clone(), embedding, config.retrieval.top_k);
        let ask = Arc::new(AskService::new(router, history.clone(), generator));

        Self {
            ask,
            history,
            registry,
            config: Arc::new(config),
        }
    }
}
