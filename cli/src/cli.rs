use clap::{Parser, Subcommand, ValueHint};
use graphdesk_model::DEFAULT_NAMESPACE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "graphdesk")]
/// Graphdesk command line toolkit and SPARQL HTTP server
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the graphdesk HTTP server
    Serve {
        /// Host and port to listen to
        #[arg(short, long, default_value = "localhost:7878", value_hint = ValueHint::Hostname)]
        bind: String,
        /// Allows cross-origin requests
        #[arg(long)]
        cors: bool,
        /// SPARQL endpoint that read operations are forwarded to
        #[arg(long, value_hint = ValueHint::Url)]
        query_endpoint: String,
        /// SPARQL endpoint that update operations are forwarded to
        ///
        /// By default the query endpoint is used.
        #[arg(long, value_hint = ValueHint::Url)]
        update_endpoint: Option<String>,
        /// Entity search service consulted by term repair
        #[arg(long, value_hint = ValueHint::Url)]
        search_endpoint: String,
        /// File the prefix table is persisted to
        #[arg(long, default_value = "nsprefixes.json", value_hint = ValueHint::FilePath)]
        prefix_file: PathBuf,
        /// Namespace used for terms with an unknown or missing prefix
        #[arg(long, default_value = DEFAULT_NAMESPACE, value_hint = ValueHint::Url)]
        default_namespace: String,
        /// OpenAI-compatible chat completions endpoint enabling the LLM routes
        #[arg(long, requires = "llm_model", value_hint = ValueHint::Url)]
        llm_endpoint: Option<String>,
        /// Model requested from the completions endpoint
        #[arg(long, requires = "llm_endpoint")]
        llm_model: Option<String>,
        /// API key sent to the completions endpoint
        #[arg(long, env = "GRAPHDESK_LLM_API_KEY", hide_env_values = true)]
        llm_api_key: Option<String>,
    },
}
