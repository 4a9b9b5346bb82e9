use async_trait::async_trait;
use graphdesk_model::Term;

/// Serialized result produced by the engine for a read operation.
pub struct QueryResponse {
    /// Content type reported by the engine, when it reports one.
    pub media_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("graph '{0}' not found")]
    GraphNotFound(String),
    #[error("{0}")]
    Upstream(String),
}

/// The RDF engine collaborator.
///
/// Query evaluation, update execution and result serialization all live
/// behind this seam; the protocol layer only hands over classified operation
/// text and the negotiated result media type.
#[async_trait]
pub trait SparqlBackend: Send + Sync {
    /// Evaluates a read operation, serializing the result per `accept`.
    async fn query(
        &self,
        graph: Option<&str>,
        query: &str,
        accept: &str,
    ) -> Result<QueryResponse, BackendError>;

    /// Applies an update operation.
    async fn update(&self, graph: Option<&str>, update: &str) -> Result<(), BackendError>;

    /// Adds a single resolved triple to a graph.
    async fn insert_triple(
        &self,
        graph: &str,
        subject: Term,
        predicate: Term,
        object: Term,
    ) -> Result<(), BackendError>;
}
