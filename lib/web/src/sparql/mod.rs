mod content_negotiation;
mod operation;
mod request;

pub use content_negotiation::{GraphFormat, ResultsFormat};
pub use operation::{classify, OperationKind, ResultShape};
pub use request::{SparqlProtocolRequest, SPARQL_QUERY_MEDIA_TYPE, SPARQL_UPDATE_MEDIA_TYPE};

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Combined endpoint: auto-routes to read or update handling based on the
/// classified operation kind.
pub async fn handle_combined(
    State(state): State<AppState>,
    results_format: ResultsFormat,
    graph_format: GraphFormat,
    request: SparqlProtocolRequest,
) -> Result<Response, ApiError> {
    let text = request.any_text()?;
    let kind = classify(&text);
    let graph = request.target_graph();
    if kind == OperationKind::Update {
        run_update(&state, graph.as_deref(), &text).await
    } else {
        run_query(&state, graph.as_deref(), &text, kind, results_format, graph_format).await
    }
}

/// Read endpoint. Update operations are rejected here even though both
/// endpoints delegate to the same engine; the split is a safety boundary.
pub async fn handle_query(
    State(state): State<AppState>,
    results_format: ResultsFormat,
    graph_format: GraphFormat,
    request: SparqlProtocolRequest,
) -> Result<Response, ApiError> {
    let text = request.query_text()?;
    let kind = classify(&text);
    if kind == OperationKind::Update {
        return Err(ApiError::BadRequest(
            "write operations are not allowed on the query endpoint".to_owned(),
        ));
    }
    run_query(
        &state,
        request.target_graph().as_deref(),
        &text,
        kind,
        results_format,
        graph_format,
    )
    .await
}

/// Update endpoint, the write half of the safety boundary.
pub async fn handle_update(
    State(state): State<AppState>,
    request: SparqlProtocolRequest,
) -> Result<Response, ApiError> {
    let text = request.update_text()?;
    let kind = classify(&text);
    if kind != OperationKind::Update {
        return Err(ApiError::BadRequest(
            "read operations are not allowed on the update endpoint".to_owned(),
        ));
    }
    run_update(&state, request.target_graph().as_deref(), &text).await
}

async fn run_query(
    state: &AppState,
    graph: Option<&str>,
    text: &str,
    kind: OperationKind,
    results_format: ResultsFormat,
    graph_format: GraphFormat,
) -> Result<Response, ApiError> {
    let accept = match kind.result_shape() {
        ResultShape::Tabular => results_format.media_type(),
        ResultShape::Graph => graph_format.media_type(),
    };
    tracing::debug!(kind = kind.as_str(), graph, accept, "evaluating SPARQL query");
    let response = state.backend.query(graph, text, accept).await?;
    let content_type = response.media_type.unwrap_or_else(|| accept.to_owned());
    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], response.body).into_response())
}

async fn run_update(
    state: &AppState,
    graph: Option<&str>,
    text: &str,
) -> Result<Response, ApiError> {
    tracing::debug!(graph, "applying SPARQL update");
    state.backend.update(graph, text).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Static description of the SPARQL endpoint's capabilities.
pub async fn handle_info() -> Json<serde_json::Value> {
    Json(json!({
        "endpoint": "/sparql",
        "read_endpoint": "/sparql/query",
        "update_endpoint": "/sparql/update",
        "supported_operations": [
            "SELECT", "CONSTRUCT", "DESCRIBE", "ASK",
            "INSERT", "DELETE", "WITH", "LOAD", "CLEAR", "CREATE", "DROP", "COPY", "MOVE", "ADD",
        ],
        "description": "Dedicated SPARQL endpoints for read and write operations",
    }))
}

/// Cross-origin preflight.
pub async fn handle_options() -> Json<serde_json::Value> {
    Json(json!({}))
}
