//! Coordinator query binary

use anyhow::Context;
use clap::Parser;
use fleetgrep::common::{parse_duration, parse_roster, validate_roster, CoordinatorConfig};
use fleetgrep::coordinator::GrpcNodeTransport;
use fleetgrep::Dispatcher;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVERS: &str = "localhost:8080,localhost:8081,localhost:8082";
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Parser, Debug)]
#[command(name = "fleetgrep-query")]
#[command(about = "Search a pattern across the log files of a fleet of machines")]
#[command(version)]
struct Args {
    /// Grep pattern to search for (required)
    #[arg(long)]
    pattern: String,

    /// Grep options (e.g. "-i", "-E", "-v")
    #[arg(long, default_value = "")]
    options: String,

    /// Comma-separated list of server addresses
    #[arg(long, default_value = DEFAULT_SERVERS)]
    servers: String,

    /// Timeout for each server query (e.g. "10s", "500ms")
    #[arg(long, default_value = DEFAULT_TIMEOUT)]
    timeout: String,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Validated before any dispatch begins
    if args.pattern.trim().is_empty() {
        anyhow::bail!("Pattern is required. Use --pattern.");
    }

    let mut roster = parse_roster(&args.servers)?;
    let mut timeout = parse_duration(&args.timeout)?;

    // Config file (if any) fills in what the CLI left at defaults
    if let Some(file_config) = CoordinatorConfig::load() {
        if args.servers == DEFAULT_SERVERS && !file_config.roster.is_empty() {
            roster = file_config.roster.clone();
        }
        if args.timeout == DEFAULT_TIMEOUT {
            timeout = file_config.per_node_timeout();
        }
    }

    // Whatever source the roster came from, it must hold unique node ids
    // or the report would cover fewer nodes than were queried
    validate_roster(&roster)?;

    eprintln!(
        "Querying {} servers for pattern: '{}'",
        roster.len(),
        args.pattern
    );
    if !args.options.is_empty() {
        eprintln!("Using grep options: {}", args.options);
    }

    let dispatcher = Dispatcher::new(GrpcNodeTransport, timeout);
    let report = dispatcher
        .dispatch(&args.pattern, &args.options, &roster)
        .await
        .context("dispatch failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}
