//! reqwest-backed implementations of the collaborator seams: the SPARQL
//! engine, the entity search service and the chat completion service.

use crate::backend::{BackendError, QueryResponse, SparqlBackend};
use crate::config::HTTP_TIMEOUT;
use crate::llm::{CompletionClient, CompletionError};
use crate::sparql::{SPARQL_QUERY_MEDIA_TYPE, SPARQL_UPDATE_MEDIA_TYPE};
use async_trait::async_trait;
use graphdesk_model::Term;
use graphdesk_repair::{EntityIndex, IndexEntry, IndexError, SearchField};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

/// Forwards operations to external SPARQL protocol endpoints.
pub struct HttpSparqlBackend {
    read_endpoint: String,
    update_endpoint: String,
    client: reqwest::Client,
}

impl HttpSparqlBackend {
    pub fn new(read_endpoint: impl Into<String>, update_endpoint: impl Into<String>) -> Self {
        Self {
            read_endpoint: read_endpoint.into(),
            update_endpoint: update_endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SparqlBackend for HttpSparqlBackend {
    async fn query(
        &self,
        graph: Option<&str>,
        query: &str,
        accept: &str,
    ) -> Result<QueryResponse, BackendError> {
        let mut request = self
            .client
            .post(&self.read_endpoint)
            .timeout(HTTP_TIMEOUT)
            .header(CONTENT_TYPE, SPARQL_QUERY_MEDIA_TYPE)
            .header(ACCEPT, accept)
            .body(query.to_owned());
        if let Some(graph) = graph {
            request = request.query(&[("default-graph-uri", graph)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Upstream(e.to_string()))?;
        let status = response.status();
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Upstream(e.to_string()))?;
        if !status.is_success() {
            return Err(BackendError::Upstream(upstream_message(&body, status)));
        }
        Ok(QueryResponse {
            media_type,
            body: body.to_vec(),
        })
    }

    async fn update(&self, graph: Option<&str>, update: &str) -> Result<(), BackendError> {
        let mut request = self
            .client
            .post(&self.update_endpoint)
            .timeout(HTTP_TIMEOUT)
            .header(CONTENT_TYPE, SPARQL_UPDATE_MEDIA_TYPE)
            .body(update.to_owned());
        if let Some(graph) = graph {
            request = request.query(&[("using-graph-uri", graph)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Upstream(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(BackendError::Upstream(upstream_message(&body, status)));
        }
        Ok(())
    }

    async fn insert_triple(
        &self,
        graph: &str,
        subject: Term,
        predicate: Term,
        object: Term,
    ) -> Result<(), BackendError> {
        // Term's Display renders each node in N-Triples syntax.
        let update =
            format!("INSERT DATA {{ GRAPH <{graph}> {{ {subject} {predicate} {object} . }} }}");
        self.update(None, &update).await
    }
}

fn upstream_message(body: &[u8], status: reqwest::StatusCode) -> String {
    let message = String::from_utf8_lossy(body);
    let message = message.trim();
    if message.is_empty() {
        format!("SPARQL endpoint returned {status}")
    } else {
        message.to_owned()
    }
}

/// Queries an external full-text search service for indexed entities.
pub struct HttpEntityIndex {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpEntityIndex {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<IndexEntry>,
}

#[async_trait]
impl EntityIndex for HttpEntityIndex {
    async fn search(
        &self,
        text: &str,
        field: SearchField,
        graph: Option<&str>,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let field = match field {
            SearchField::Label => "label",
            SearchField::Iri => "iri",
        };
        let mut request = self
            .client
            .get(&self.endpoint)
            .timeout(HTTP_TIMEOUT)
            .query(&[("q", text), ("field", field)]);
        if let Some(graph) = graph {
            request = request.query(&[("graph_id", graph)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IndexError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(IndexError(format!(
                "search service returned {}",
                response.status()
            )));
        }
        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| IndexError(e.to_string()))?;
        Ok(results.results)
    }
}

const COMPLETION_TEMPERATURE: f64 = 0.2;
const COMPLETION_MAX_TOKENS: u32 = 512;

/// Talks to an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": COMPLETION_TEMPERATURE,
            "max_tokens": COMPLETION_MAX_TOKENS,
        });
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(HTTP_TIMEOUT)
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CompletionError(format!(
                "completion endpoint returned {}",
                response.status()
            )));
        }
        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| CompletionError(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError("completion response contained no choices".to_owned()))
    }
}
