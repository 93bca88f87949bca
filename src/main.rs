use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::Level;

use context_engine::banner::{BannerInfo, print_banner, print_batch_summary};
use context_engine::batch::{BatchRunner, StoreEngine, successes, write_results};
use context_engine::config::{ModelConfig, ServerConfig};
use context_engine::consts::{
    DEFAULT_BASE_OUTPUT, DEFAULT_BIND, DEFAULT_INSIGHT_OUTPUT, DEFAULT_MODEL, DEFAULT_OLLAMA_URL,
    DEFAULT_STORE_PATH,
};
use context_engine::insight::InsightGenerator;
use context_engine::model::ollama::OllamaClient;
use context_engine::server::{self, AppState};
use context_engine::store::ContentStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PipelineArg {
    /// Dump base engine outputs only
    Base,
    /// Chain base engine outputs into the model
    Insight,
}

#[derive(Parser)]
#[command(
    name = "context-engine",
    version,
    about = "Explains why a post performed the way it did, using a local LLM."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Ollama generate endpoint
    #[arg(long, env = "CONTEXT_ENGINE_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL, global = true)]
    ollama_url: String,

    /// Model name sent with every request
    #[arg(short, long, env = "CONTEXT_ENGINE_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// JSON file mapping content id to engine output
    #[arg(short, long, env = "CONTEXT_ENGINE_STORE", default_value = DEFAULT_STORE_PATH, global = true)]
    store: PathBuf,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = DEFAULT_BIND)]
        bind: String,
    },
    /// Analyze every content item and write the results to a file
    Batch {
        #[arg(short, long, value_enum, default_value_t = PipelineArg::Insight)]
        pipeline: PipelineArg,

        /// Only run these content ids (unknown ids are skipped)
        #[arg(long, num_args = 1..)]
        only: Vec<String>,

        /// Output file (defaults depend on the pipeline)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = ContentStore::load(&cli.store).with_context(|| {
        format!("cannot start without a content store ({})", cli.store.display())
    })?;
    let store = Arc::new(store);

    let model_config = ModelConfig {
        url: cli.ollama_url,
        model: cli.model,
    };
    let client = OllamaClient::new(model_config.clone());
    let insights = Arc::new(InsightGenerator::new(Arc::new(client)));

    let command = cli.command.unwrap_or(Command::Serve {
        bind: DEFAULT_BIND.to_string(),
    });

    match command {
        Command::Serve { bind } => {
            let server_config = ServerConfig::from_bind(&bind)?;
            print_banner(&BannerInfo {
                model: &model_config.model,
                model_url: &model_config.url,
                store: &cli.store,
                items: store.len(),
                bind: server_config.bind,
            });
            server::serve(&server_config, AppState::new(store, insights)).await
        }
        Command::Batch {
            pipeline,
            only,
            output,
        } => {
            let engine = Arc::new(StoreEngine::new(store));
            let (mut runner, default_output) = match pipeline {
                PipelineArg::Base => (BatchRunner::base(engine), DEFAULT_BASE_OUTPUT),
                PipelineArg::Insight => (
                    BatchRunner::insight(engine, insights),
                    DEFAULT_INSIGHT_OUTPUT,
                ),
            };
            if !only.is_empty() {
                runner = runner.only(only);
            }
            let output = output.unwrap_or_else(|| PathBuf::from(default_output));

            tracing::info!(pipeline = ?runner.pipeline(), "batch started");
            let outcomes = runner.run_for_all().await;
            let results = successes(&outcomes);
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();

            write_results(&output, &results)?;
            print_batch_summary(results.len(), failed, &output);
            Ok(())
        }
    }
}
