use axum::routing::{get, post, put};
use axum::Router;

mod backend;
mod config;
mod error;
mod llm;
mod prefixes;
mod remote;
mod sparql;
mod state;
mod triples;

pub use backend::{BackendError, QueryResponse, SparqlBackend};
pub use config::ServerConfig;
pub use error::ApiError;
pub use llm::{CompletionClient, CompletionError};
pub use remote::{ChatCompletionClient, HttpEntityIndex, HttpSparqlBackend};
pub use sparql::{classify, OperationKind};
pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/sparql",
            get(sparql::handle_combined)
                .post(sparql::handle_combined)
                .options(sparql::handle_options),
        )
        .route(
            "/sparql/query",
            get(sparql::handle_query).post(sparql::handle_query),
        )
        .route("/sparql/update", post(sparql::handle_update))
        .route("/sparql/info", get(sparql::handle_info))
        .route(
            "/api/prefixes",
            get(prefixes::list_prefixes).post(prefixes::add_prefix),
        )
        .route(
            "/api/prefixes/{prefix}",
            put(prefixes::update_prefix).delete(prefixes::remove_prefix),
        )
        .route("/api/graphs/{graph_id}/triples", post(triples::add_triple))
        .route("/api/llm/sparql", post(llm::draft_sparql))
        .route("/api/llm/repair", post(llm::fix_sparql))
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let bind = config.bind.clone();
    let cors = config.cors;

    let app = create_router(AppState::from(config));
    let app = if cors {
        app.layer(tower_http::cors::CorsLayer::permissive())
    } else {
        app
    };

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {bind}");
    Ok(axum::serve(listener, app).await?)
}
