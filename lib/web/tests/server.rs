use assert_fs::TempDir;
use async_trait::async_trait;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use graphdesk_model::{Term, DEFAULT_NAMESPACE};
use graphdesk_prefixes::PrefixStore;
use graphdesk_repair::{EntityIndex, IndexEntry, IndexError, RepairConfig, SearchField};
use graphdesk_web::{
    AppState, BackendError, CompletionClient, CompletionError, QueryResponse, SparqlBackend,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
enum BackendCall {
    Query {
        graph: Option<String>,
        text: String,
        accept: String,
    },
    Update {
        graph: Option<String>,
        text: String,
    },
    Insert {
        graph: String,
        triple: String,
    },
}

#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
}

impl RecordingBackend {
    fn last_call(&self) -> BackendCall {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no backend call recorded")
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SparqlBackend for RecordingBackend {
    async fn query(
        &self,
        graph: Option<&str>,
        query: &str,
        accept: &str,
    ) -> Result<QueryResponse, BackendError> {
        self.record(BackendCall::Query {
            graph: graph.map(str::to_owned),
            text: query.to_owned(),
            accept: accept.to_owned(),
        });
        Ok(QueryResponse {
            media_type: None,
            body: br#"{"head":{"vars":[]},"results":{"bindings":[]}}"#.to_vec(),
        })
    }

    async fn update(&self, graph: Option<&str>, update: &str) -> Result<(), BackendError> {
        self.record(BackendCall::Update {
            graph: graph.map(str::to_owned),
            text: update.to_owned(),
        });
        Ok(())
    }

    async fn insert_triple(
        &self,
        graph: &str,
        subject: Term,
        predicate: Term,
        object: Term,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Insert {
            graph: graph.to_owned(),
            triple: format!("{subject} {predicate} {object}"),
        });
        Ok(())
    }
}

struct FailingBackend;

#[async_trait]
impl SparqlBackend for FailingBackend {
    async fn query(
        &self,
        _graph: Option<&str>,
        _query: &str,
        _accept: &str,
    ) -> Result<QueryResponse, BackendError> {
        Err(BackendError::Upstream("engine exploded".to_owned()))
    }

    async fn update(&self, _graph: Option<&str>, _update: &str) -> Result<(), BackendError> {
        Err(BackendError::Upstream("engine exploded".to_owned()))
    }

    async fn insert_triple(
        &self,
        _graph: &str,
        _subject: Term,
        _predicate: Term,
        _object: Term,
    ) -> Result<(), BackendError> {
        Err(BackendError::Upstream("engine exploded".to_owned()))
    }
}

/// In-memory stand-in for the search service; a hit matches when any
/// whitespace-separated token of the search text occurs in the field.
struct StaticIndex {
    entries: Vec<IndexEntry>,
}

impl StaticIndex {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(iri, label)| IndexEntry {
                    iri: (*iri).to_owned(),
                    label: (!label.is_empty()).then(|| (*label).to_owned()),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl EntityIndex for StaticIndex {
    async fn search(
        &self,
        text: &str,
        field: SearchField,
        _graph: Option<&str>,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let text = text.to_lowercase();
        let tokens: Vec<&str> = text.split_whitespace().collect();
        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                let value = match field {
                    SearchField::Iri => entry.iri.to_lowercase(),
                    SearchField::Label => entry.label.clone().unwrap_or_default().to_lowercase(),
                };
                tokens.iter().any(|token| value.contains(token))
            })
            .cloned()
            .collect())
    }
}

struct CannedLlm {
    reply: String,
}

#[async_trait]
impl CompletionClient for CannedLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }
}

struct TestContext {
    server: TestServer,
    backend: Arc<RecordingBackend>,
    prefixes: Arc<PrefixStore>,
    _dir: TempDir,
}

fn context() -> TestContext {
    context_with(StaticIndex::empty(), None)
}

fn context_with(index: StaticIndex, llm: Option<Arc<dyn CompletionClient>>) -> TestContext {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let prefixes = Arc::new(
        PrefixStore::open(dir.path().join("nsprefixes.json"), DEFAULT_NAMESPACE).unwrap(),
    );
    let state = AppState {
        backend: backend.clone(),
        index: Arc::new(index),
        prefixes: prefixes.clone(),
        llm,
        repair: RepairConfig::default(),
    };
    TestContext {
        server: TestServer::new(graphdesk_web::create_router(state)).unwrap(),
        backend,
        prefixes,
        _dir: dir,
    }
}

#[tokio::test]
async fn query_via_query_string_defaults_to_json_results() {
    let ctx = context();
    let response = ctx
        .server
        .get("/sparql/query")
        .add_query_param("query", "SELECT * WHERE { ?s ?p ?o }")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/sparql-results+json"
    );
    assert_eq!(
        ctx.backend.last_call(),
        BackendCall::Query {
            graph: None,
            text: "SELECT * WHERE { ?s ?p ?o }".to_owned(),
            accept: "application/sparql-results+json".to_owned(),
        }
    );
}

#[tokio::test]
async fn accept_header_negotiates_the_results_format() {
    let ctx = context();
    let response = ctx
        .server
        .get("/sparql/query")
        .add_query_param("query", "SELECT * WHERE { ?s ?p ?o }")
        .add_header(ACCEPT, HeaderValue::from_static("text/csv"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let BackendCall::Query { accept, .. } = ctx.backend.last_call() else {
        panic!("expected a query call");
    };
    assert_eq!(accept, "text/csv");
}

#[tokio::test]
async fn construct_queries_negotiate_rdf_serializations() {
    let ctx = context();
    ctx.server
        .get("/sparql/query")
        .add_query_param("query", "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")
        .await;

    let BackendCall::Query { accept, .. } = ctx.backend.last_call() else {
        panic!("expected a query call");
    };
    assert_eq!(accept, "text/turtle");
}

#[tokio::test]
async fn query_endpoint_rejects_updates() {
    let ctx = context();
    let response = ctx
        .server
        .post("/sparql/query")
        .json(&json!({ "query": "INSERT DATA { <a://s> <a://p> <a://o> }" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("not allowed"));
}

#[tokio::test]
async fn update_endpoint_executes_updates_with_no_body() {
    let ctx = context();
    let response = ctx
        .server
        .post("/sparql/update")
        .json(&json!({ "update": "DELETE WHERE { ?s ?p ?o }", "graph_id": "g1" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(
        ctx.backend.last_call(),
        BackendCall::Update {
            graph: Some("g1".to_owned()),
            text: "DELETE WHERE { ?s ?p ?o }".to_owned(),
        }
    );
}

#[tokio::test]
async fn update_endpoint_rejects_reads() {
    let ctx = context();
    let response = ctx
        .server
        .post("/sparql/update")
        .json(&json!({ "update": "SELECT * WHERE { ?s ?p ?o }" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn combined_endpoint_routes_on_classification() {
    let ctx = context();

    let response = ctx
        .server
        .post("/sparql")
        .json(&json!({ "query": "INSERT DATA { <a://s> <a://p> <a://o> }" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(matches!(ctx.backend.last_call(), BackendCall::Update { .. }));

    let response = ctx
        .server
        .post("/sparql")
        .json(&json!({ "query": "ASK { ?s ?p ?o }" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(matches!(ctx.backend.last_call(), BackendCall::Query { .. }));
}

#[tokio::test]
async fn raw_sparql_query_body_is_accepted() {
    let ctx = context();
    let response = ctx
        .server
        .post("/sparql/query")
        .add_header(CONTENT_TYPE, HeaderValue::from_static("application/sparql-query"))
        .bytes("ASK { ?s ?p ?o }".into())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let BackendCall::Query { text, .. } = ctx.backend.last_call() else {
        panic!("expected a query call");
    };
    assert_eq!(text, "ASK { ?s ?p ?o }");
}

#[tokio::test]
async fn missing_operation_text_yields_a_structured_error() {
    let ctx = context();
    let response = ctx.server.get("/sparql/query").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn upstream_failures_are_passed_through_verbatim() {
    let dir = TempDir::new().unwrap();
    let prefixes = Arc::new(
        PrefixStore::open(dir.path().join("nsprefixes.json"), DEFAULT_NAMESPACE).unwrap(),
    );
    let state = AppState {
        backend: Arc::new(FailingBackend),
        index: Arc::new(StaticIndex::empty()),
        prefixes,
        llm: None,
        repair: RepairConfig::default(),
    };
    let server = TestServer::new(graphdesk_web::create_router(state)).unwrap();

    let response = server
        .get("/sparql/query")
        .add_query_param("query", "ASK { ?s ?p ?o }")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "engine exploded");
}

#[tokio::test]
async fn info_endpoint_describes_capabilities() {
    let ctx = context();
    let response = ctx.server.get("/sparql/info").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["read_endpoint"], "/sparql/query");
    assert_eq!(body["update_endpoint"], "/sparql/update");
    assert!(body["supported_operations"]
        .as_array()
        .unwrap()
        .contains(&json!("SELECT")));
}

#[tokio::test]
async fn options_preflight_is_an_empty_success() {
    let ctx = context();
    let response = ctx.server.method(axum::http::Method::OPTIONS, "/sparql").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn prefix_routes_round_trip() {
    let ctx = context();

    let response = ctx.server.get("/api/prefixes").await;
    assert_eq!(response.json::<BTreeMap<String, String>>(), BTreeMap::new());

    let response = ctx
        .server
        .post("/api/prefixes")
        .json(&json!({ "prefix": "ex", "uri": "http://ex.org/" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = ctx.server.get("/api/prefixes").await;
    assert_eq!(
        response.json::<BTreeMap<String, String>>(),
        BTreeMap::from([("ex".to_owned(), "http://ex.org/".to_owned())])
    );

    let response = ctx
        .server
        .post("/api/prefixes")
        .json(&json!({ "prefix": "ex", "uri": "http://other.org/" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // update inserts unconditionally, even for prefixes never added
    let response = ctx
        .server
        .put("/api/prefixes/xsd")
        .json(&json!({ "uri": "http://www.w3.org/2001/XMLSchema#" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = ctx.server.delete("/api/prefixes/ex").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = ctx.server.delete("/api/prefixes/ex").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_triple_resolves_the_term_notation() {
    let ctx = context();
    ctx.prefixes.add("ex", "http://ex.org/").unwrap();
    ctx.prefixes
        .add("xsd", "http://www.w3.org/2001/XMLSchema#")
        .unwrap();

    let response = ctx
        .server
        .post("/api/graphs/g1/triples")
        .json(&json!({
            "subject": "ex:alice",
            "predicate": "a",
            "object": "\"42\"^^xsd:integer",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        ctx.backend.last_call(),
        BackendCall::Insert {
            graph: "g1".to_owned(),
            triple: "<http://ex.org/alice> \
                     <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
                     \"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
                .to_owned(),
        }
    );
}

#[tokio::test]
async fn drafted_queries_are_repaired_against_the_index() {
    let llm: Arc<dyn CompletionClient> = Arc::new(CannedLlm {
        reply: "SELECT * WHERE { ?s ex:nmae ?o }".to_owned(),
    });
    let ctx = context_with(
        StaticIndex::with(&[("http://ex.org/name", "name")]),
        Some(llm),
    );
    ctx.prefixes.add("ex", "http://ex.org/").unwrap();

    let response = ctx
        .server
        .post("/api/llm/sparql")
        .json(&json!({ "question": "What is the name?", "graph_id": "g1" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body["query"],
        "PREFIX ex: <http://ex.org/>\n\nSELECT * WHERE { ?s ex:name ?o }"
    );
    assert_eq!(body["replacements"], json!({ "ex:nmae": "ex:name" }));
}

#[tokio::test]
async fn llm_routes_require_a_configured_client() {
    let ctx = context();
    let response = ctx
        .server
        .post("/api/llm/sparql")
        .json(&json!({ "question": "anything" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "LLM features are disabled");
}
