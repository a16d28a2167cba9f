//! kgflow - run Graphiti knowledge-graph nodes outside a workflow engine
//!
//! Usage:
//!   kgflow nodes                                    -> list adapters
//!   kgflow describe graphitiMemory                  -> manifest JSON
//!   kgflow run graphiti --operation healthcheck     -> run a node
//!   kgflow tool graphitiKnowledgeTool --args '{..}' -> invoke a tool node
//!   kgflow check                                    -> test credentials
//!   kgflow version                                  -> show version

use anyhow::Context;
use clap::{Parser, Subcommand};
use kgflow::commands::{self, RunOptions};
use kgflow_core::ConnectivityProbe;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "kgflow",
    about = "Graphiti knowledge-graph workflow nodes",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.kgflow/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered nodes
    Nodes,
    /// Print a node's manifest (and tool schema for tool nodes)
    Describe { node: String },
    /// Run a node over input items
    Run {
        node: String,
        /// Operation to perform
        #[arg(short, long)]
        operation: String,
        /// Node parameter as key=value (value parsed as JSON when possible)
        #[arg(short, long = "param", value_parser = commands::parse_param)]
        params: Vec<(String, Value)>,
        /// Input items: a JSON array or JSON lines (default: one empty item)
        #[arg(short, long)]
        items: Option<PathBuf>,
        /// Emit error records for failing items instead of aborting
        #[arg(long, default_value_t = false)]
        continue_on_fail: bool,
    },
    /// Invoke a tool node with a JSON argument object
    Tool {
        node: String,
        #[arg(short, long)]
        args: String,
    },
    /// Test that the configured Graphiti server is reachable
    Check {
        /// healthcheck or episodes (default: from config)
        #[arg(long)]
        probe: Option<ConnectivityProbe>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let registry = kgflow_nodes::default_registry();
    let output = match cli.command {
        Commands::Version => {
            println!("kgflow v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Nodes => commands::list_nodes(&registry),
        Commands::Describe { node } => commands::describe(&registry, &node)?,
        Commands::Run {
            node,
            operation,
            params,
            items,
            continue_on_fail,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let items = match items {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    Some(commands::parse_items(&text)?)
                }
                None => None,
            };
            let transport = commands::transport_for(&config)?;
            let opts = RunOptions {
                node,
                operation,
                params,
                items,
                continue_on_fail,
            };
            commands::run(&registry, &config, transport, opts).await?
        }
        Commands::Tool { node, args } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let transport = commands::transport_for(&config)?;
            commands::tool(&registry, &config, transport, &node, &args).await?
        }
        Commands::Check { probe } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let transport = commands::transport_for(&config)?;
            commands::check(&config, transport, probe).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kgflow=info,kgflow_nodes=info,kgflow_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
