use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub async fn list_prefixes(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.prefixes.snapshot().entries().clone())
}

#[derive(Deserialize)]
pub struct AddPrefixRequest {
    prefix: String,
    uri: String,
}

pub async fn add_prefix(
    State(state): State<AppState>,
    Json(request): Json<AddPrefixRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.prefix.is_empty() || request.uri.is_empty() {
        return Err(ApiError::BadRequest("prefix and uri are required".to_owned()));
    }
    state.prefixes.add(&request.prefix, &request.uri)?;
    tracing::debug!(prefix = %request.prefix, "registered prefix");
    Ok((StatusCode::CREATED, Json(json!({ "message": "prefix added" }))))
}

#[derive(Deserialize)]
pub struct UpdatePrefixRequest {
    uri: String,
}

pub async fn update_prefix(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    Json(request): Json<UpdatePrefixRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.uri.is_empty() {
        return Err(ApiError::BadRequest("uri is required".to_owned()));
    }
    state.prefixes.update(&prefix, &request.uri)?;
    Ok(Json(json!({ "message": "prefix updated" })))
}

pub async fn remove_prefix(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.prefixes.remove(&prefix)?;
    Ok(Json(json!({ "message": "prefix removed" })))
}
