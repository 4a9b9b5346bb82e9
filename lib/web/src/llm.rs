use crate::error::ApiError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::State;
use axum::Json;
use graphdesk_model::PrefixTable;
use graphdesk_repair::repair_query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failure reported by the completion service, message passed through
/// verbatim.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CompletionError(pub String);

/// The LLM completion collaborator.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

const DRAFT_SYSTEM_PROMPT: &str = "You are a SPARQL expert. Return ONLY the raw SPARQL query. \
     Do not include markdown. Include required PREFIX declarations.";
const FIX_SYSTEM_PROMPT: &str = "You are a SPARQL expert. Fix the query based on the error. \
     Return ONLY the corrected SPARQL query.";

#[derive(Deserialize)]
pub struct DraftRequest {
    question: String,
    #[serde(default)]
    graph_id: Option<String>,
}

#[derive(Serialize)]
pub struct DraftResponse {
    query: String,
    replacements: BTreeMap<String, String>,
}

/// Drafts a SPARQL query for a natural-language question and, when a target
/// graph is given, repairs prefixed names the draft got wrong.
pub async fn draft_sparql(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, ApiError> {
    let Some(client) = &state.llm else {
        return Err(ApiError::BadRequest("LLM features are disabled".to_owned()));
    };
    if request.question.is_empty() {
        return Err(ApiError::BadRequest("question is required".to_owned()));
    }
    let table = state.prefixes.snapshot();

    let mut parts = vec![format!("Question: {}", request.question)];
    let prefix_block = prefix_context(&table);
    if !prefix_block.is_empty() {
        parts.push(format!("Available prefixes:\n{prefix_block}"));
    }
    let user = parts.join("\n");

    let draft = client
        .complete(DRAFT_SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    let draft = ensure_prefixes(draft.trim(), &table);

    let (query, replacements) = match &request.graph_id {
        Some(graph) => {
            let outcome = repair_query(
                &draft,
                Some(graph),
                Some(&request.question),
                &table,
                state.index.as_ref(),
                state.repair,
            )
            .await;
            if !outcome.replacements.is_empty() {
                tracing::debug!(count = outcome.replacements.len(), "repaired drafted query");
            }
            (outcome.query, outcome.replacements)
        }
        None => (draft, BTreeMap::new()),
    };

    Ok(Json(DraftResponse {
        query,
        replacements,
    }))
}

#[derive(Deserialize)]
pub struct FixRequest {
    query: String,
    error: String,
}

#[derive(Serialize)]
pub struct FixResponse {
    query: String,
}

/// Asks the LLM to fix a query given the error the engine reported for it.
pub async fn fix_sparql(
    State(state): State<AppState>,
    Json(request): Json<FixRequest>,
) -> Result<Json<FixResponse>, ApiError> {
    let Some(client) = &state.llm else {
        return Err(ApiError::BadRequest("LLM features are disabled".to_owned()));
    };
    if request.query.is_empty() || request.error.is_empty() {
        return Err(ApiError::BadRequest("query and error are required".to_owned()));
    }

    let user = format!("Query:\n{}\n\nError:\n{}", request.query, request.error);
    let fixed = client
        .complete(FIX_SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(Json(FixResponse {
        query: fixed.trim().to_owned(),
    }))
}

/// The known prefixes as PREFIX declarations, one per line.
fn prefix_context(table: &PrefixTable) -> String {
    table
        .entries()
        .iter()
        .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepends the known prefixes when a draft uses prefixed names without
/// declaring any.
fn ensure_prefixes(query: &str, table: &PrefixTable) -> String {
    if query.to_uppercase().contains("PREFIX") {
        return query.to_owned();
    }
    if query.contains(':') && !table.is_empty() {
        return format!("{}\n\n{}", prefix_context(table), query);
    }
    query.to_owned()
}
