//! fleet-monitor - health monitoring and alert escalation service
//!
//! Loads the monitor configuration, starts the background evaluators and
//! serves the HTTP surface until interrupted.

#![allow(missing_docs)]

use clap::Parser;
use fleet_monitor::server;
use fleet_monitor::utils::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "monitor", version, about = "Fleet health monitor")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "MONITOR_CONFIG", default_value = "config/monitor.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match server::builder::run_server(&args.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
