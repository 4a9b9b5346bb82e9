use crate::backend::SparqlBackend;
use crate::config::ServerConfig;
use crate::llm::CompletionClient;
use graphdesk_prefixes::PrefixStore;
use graphdesk_repair::{EntityIndex, RepairConfig};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SparqlBackend>,
    pub index: Arc<dyn EntityIndex>,
    pub prefixes: Arc<PrefixStore>,
    pub llm: Option<Arc<dyn CompletionClient>>,
    pub repair: RepairConfig,
}

impl From<ServerConfig> for AppState {
    fn from(config: ServerConfig) -> Self {
        Self {
            backend: config.backend,
            index: config.index,
            prefixes: config.prefixes,
            llm: config.llm,
            repair: config.repair,
        }
    }
}
