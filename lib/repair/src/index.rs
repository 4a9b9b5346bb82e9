use async_trait::async_trait;
use serde::Deserialize;

/// Which indexed field a search runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchField {
    Label,
    Iri,
}

/// A single hit returned by the entity index.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub iri: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Failure reported by the entity index, message passed through verbatim.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct IndexError(pub String);

/// The entity search index collaborator.
///
/// The index is the source of truth for whether a term exists in a graph's
/// data. Searches may optionally be scoped to a single graph.
#[async_trait]
pub trait EntityIndex: Send + Sync {
    async fn search(
        &self,
        text: &str,
        field: SearchField,
        graph: Option<&str>,
    ) -> Result<Vec<IndexEntry>, IndexError>;
}
