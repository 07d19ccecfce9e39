//! Telemetry agent
//!
//! Reports a service as up, then pushes resource and custom metrics to the
//! monitor on a fixed interval until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use fleet_monitor::client::{ClientConfig, TelemetryClient};
use fleet_monitor::core::models::{ServiceName, ServiceStatus};
use fleet_monitor::utils::logging::init_tracing;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "telemetry-agent", version, about = "Push service telemetry to the fleet monitor")]
struct Args {
    /// Root URL of the monitor
    #[arg(long, env = "MONITOR_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Service to report for, e.g. data_fetcher
    #[arg(long, env = "MONITOR_SERVICE")]
    service: ServiceName,

    /// Bearer token sent with every request
    #[arg(long, env = "MONITOR_API_KEY")]
    api_key: Option<String>,

    /// Seconds between metric pushes
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Extra metric as key=value, repeatable
    #[arg(long = "metric", value_parser = parse_metric)]
    metrics: Vec<(String, f64)>,

    /// Health endpoint the monitor should probe
    #[arg(long)]
    endpoint: Option<String>,
}

fn parse_metric(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("metric name is empty".to_string());
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::new(args.base_url, args.service)
        .with_interval(Duration::from_secs(args.interval));
    if let Some(api_key) = args.api_key {
        config = config.with_api_key(api_key);
    }
    let client = TelemetryClient::new(config).context("invalid client configuration")?;

    client
        .update_status(ServiceStatus::Up, args.endpoint.as_deref())
        .await
        .context("initial status report failed")?;
    info!(service = %args.service, "reported up");

    let (shutdown, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl-C, stopping"),
            Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
        }
        let _ = shutdown.send(true);
    });

    client.run_loop(&args.metrics, rx).await;
    Ok(())
}
