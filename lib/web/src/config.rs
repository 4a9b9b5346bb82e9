use crate::backend::SparqlBackend;
use crate::llm::CompletionClient;
use graphdesk_prefixes::PrefixStore;
use graphdesk_repair::{EntityIndex, RepairConfig};
use std::sync::Arc;
use std::time::Duration;

pub const MAX_SPARQL_BODY_SIZE: usize = 1024 * 1024 * 128; // 128MB
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Holds the configuration for a graphdesk web server.
pub struct ServerConfig {
    /// The RDF engine that operations are delegated to.
    pub backend: Arc<dyn SparqlBackend>,
    /// The entity index consulted by term repair.
    pub index: Arc<dyn EntityIndex>,
    /// The durable prefix registry.
    pub prefixes: Arc<PrefixStore>,
    /// Chat completion client; the LLM routes report an error when unset.
    pub llm: Option<Arc<dyn CompletionClient>>,
    /// Similarity thresholds used by term repair.
    pub repair: RepairConfig,
    /// The IP address or DNS name that the socket binds to.
    pub bind: String,
    /// Whether CORS is enabled.
    pub cors: bool,
}
