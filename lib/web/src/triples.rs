use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use graphdesk_model::{resolve_term, TermPosition};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct TripleRequest {
    subject: String,
    predicate: String,
    object: String,
}

/// Resolves the three terms of an edit request against the current prefix
/// table and hands the typed triple to the engine.
pub async fn add_triple(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
    Json(request): Json<TripleRequest>,
) -> Result<Json<Value>, ApiError> {
    let table = state.prefixes.snapshot();
    let subject = resolve_term(&request.subject, TermPosition::Subject, &table);
    let predicate = resolve_term(&request.predicate, TermPosition::Predicate, &table);
    let object = resolve_term(&request.object, TermPosition::Object, &table);

    tracing::debug!(graph = %graph_id, "adding triple");
    state
        .backend
        .insert_triple(&graph_id, subject, predicate, object)
        .await?;
    Ok(Json(json!({ "message": "triple added" })))
}
