use crate::config::MAX_SPARQL_BODY_SIZE;
use crate::error::ApiError;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::BTreeMap;

pub const SPARQL_QUERY_MEDIA_TYPE: &str = "application/sparql-query";
pub const SPARQL_UPDATE_MEDIA_TYPE: &str = "application/sparql-update";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    SparqlQuery,
    SparqlUpdate,
    Other,
}

/// The decoded sources of a SPARQL protocol request.
///
/// All possible carriers of the operation text and the target graph are
/// gathered up front; the accessors then apply the protocol's selection
/// order: JSON body field, form field, raw body under the SPARQL media
/// types, query-string parameter, raw body as last resort.
pub struct SparqlProtocolRequest {
    params: BTreeMap<String, String>,
    json: Option<Value>,
    form: BTreeMap<String, String>,
    raw: Option<String>,
    body_kind: BodyKind,
}

impl<S: Send + Sync> FromRequest<S> for SparqlProtocolRequest {
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let params = req.uri().query().map(parse_form).unwrap_or_default();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(req.into_body(), MAX_SPARQL_BODY_SIZE)
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))?;

        let mut json = None;
        let mut form = BTreeMap::new();
        let mut raw = None;
        let body_kind = match content_type.as_str() {
            "application/json" => {
                if !bytes.is_empty() {
                    json = Some(serde_json::from_slice(&bytes).map_err(|e| {
                        ApiError::BadRequest(format!("request body is not valid JSON: {e}"))
                    })?);
                }
                BodyKind::Json
            }
            "application/x-www-form-urlencoded" => {
                form = parse_form(&String::from_utf8_lossy(&bytes));
                BodyKind::Form
            }
            SPARQL_QUERY_MEDIA_TYPE => {
                raw = Some(utf8_body(&bytes)?);
                BodyKind::SparqlQuery
            }
            SPARQL_UPDATE_MEDIA_TYPE => {
                raw = Some(utf8_body(&bytes)?);
                BodyKind::SparqlUpdate
            }
            _ => {
                raw = String::from_utf8(bytes.to_vec()).ok();
                BodyKind::Other
            }
        };

        Ok(Self {
            params,
            json,
            form,
            raw,
            body_kind,
        })
    }
}

impl SparqlProtocolRequest {
    /// Operation text for the read endpoint.
    pub fn query_text(&self) -> Result<String, ApiError> {
        self.operation_text(&["query"], &[BodyKind::SparqlQuery])
    }

    /// Operation text for the update endpoint. The `query` field is accepted
    /// as a fallback for compatibility.
    pub fn update_text(&self) -> Result<String, ApiError> {
        self.operation_text(&["update", "query"], &[BodyKind::SparqlUpdate])
    }

    /// Operation text for the combined endpoint, accepting either field and
    /// either raw-body media type.
    pub fn any_text(&self) -> Result<String, ApiError> {
        self.operation_text(
            &["update", "query"],
            &[BodyKind::SparqlQuery, BodyKind::SparqlUpdate],
        )
    }

    /// The target graph: explicit `graph_id` parameter, then the JSON body
    /// field, then the form field, then the protocol's default-graph
    /// parameter.
    pub fn target_graph(&self) -> Option<String> {
        self.param("graph_id")
            .or_else(|| self.json_field("graph_id"))
            .or_else(|| self.form_field("graph_id"))
            .or_else(|| self.param("default-graph-uri"))
    }

    fn operation_text(
        &self,
        fields: &[&str],
        body_kinds: &[BodyKind],
    ) -> Result<String, ApiError> {
        for field in fields {
            if let Some(value) = self.json_field(field) {
                return Ok(value);
            }
        }
        for field in fields {
            if let Some(value) = self.form_field(field) {
                return Ok(value);
            }
        }
        if body_kinds.contains(&self.body_kind) {
            if let Some(raw) = self.raw_body() {
                return Ok(raw);
            }
        }
        for field in fields {
            if let Some(value) = self.param(field) {
                return Ok(value);
            }
        }
        if self.body_kind == BodyKind::Other {
            if let Some(raw) = self.raw_body() {
                return Ok(raw);
            }
        }
        Err(ApiError::BadRequest(format!(
            "SPARQL operation text is required (parameter '{}')",
            fields[0]
        )))
    }

    fn json_field(&self, name: &str) -> Option<String> {
        self.json
            .as_ref()?
            .get(name)?
            .as_str()
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    fn form_field(&self, name: &str) -> Option<String> {
        self.form
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn param(&self, name: &str) -> Option<String> {
        self.params
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn raw_body(&self) -> Option<String> {
        self.raw
            .clone()
            .filter(|value| !value.trim().is_empty())
    }
}

fn parse_form(input: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}

fn utf8_body(bytes: &[u8]) -> Result<String, ApiError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ApiError::BadRequest("request body is not valid UTF-8".to_owned()))
}
