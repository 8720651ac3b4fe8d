//! Query node binary

use anyhow::Result;
use clap::Parser;
use fleetgrep::common::NodeConfig;
use fleetgrep::QueryNode;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fleetgrep-node")]
#[command(about = "fleetgrep query node - serves one machine's log shard")]
#[command(version)]
struct Args {
    /// Machine ID for this node (determines the log file name)
    #[arg(short, long, default_value = "1")]
    machine: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Directory containing the machine log file
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::new(args.machine, args.port, args.log_dir)?;
    QueryNode::new(config).serve().await?;

    Ok(())
}
