use crate::cli::{Args, Command};
use anyhow::Context;
use clap::Parser;
use graphdesk_prefixes::PrefixStore;
use graphdesk_repair::RepairConfig;
use graphdesk_web::{
    ChatCompletionClient, CompletionClient, HttpEntityIndex, HttpSparqlBackend, ServerConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = Args::parse();
    match matches.command {
        Command::Serve {
            bind,
            cors,
            query_endpoint,
            update_endpoint,
            search_endpoint,
            prefix_file,
            default_namespace,
            llm_endpoint,
            llm_model,
            llm_api_key,
        } => {
            let prefixes = PrefixStore::open(&prefix_file, default_namespace).with_context(
                || format!("failed to load prefix table from {}", prefix_file.display()),
            )?;
            let update_endpoint = update_endpoint.unwrap_or_else(|| query_endpoint.clone());
            let llm = match (llm_endpoint, llm_model) {
                (Some(endpoint), Some(model)) => Some(Arc::new(ChatCompletionClient::new(
                    endpoint,
                    model,
                    llm_api_key,
                )) as Arc<dyn CompletionClient>),
                _ => None,
            };

            let config = ServerConfig {
                backend: Arc::new(HttpSparqlBackend::new(query_endpoint, update_endpoint)),
                index: Arc::new(HttpEntityIndex::new(search_endpoint)),
                prefixes: Arc::new(prefixes),
                llm,
                repair: RepairConfig::default(),
                bind,
                cors,
            };
            graphdesk_web::serve(config).await
        }
    }
}
