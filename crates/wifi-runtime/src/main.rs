//! # WiFi Runtime
//!
//! Entry point of the echo demo. See the library docs for the flow.

use anyhow::{Context, Result};
use tracing::info;

use wifi_runtime::{load_sockets_config, run_echo_demo, DemoConfig};
use wifi_telemetry::{init_logging, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env().with_service_name("wifi-runtime");
    let _guard = init_logging(&telemetry).context("initialising logging")?;

    let sockets = load_sockets_config()?;
    let report = run_echo_demo(DemoConfig::new(sockets)).await?;

    info!(
        completed = report.completed,
        retries = report.retries,
        resets = report.stats.resets,
        failed_resets = report.stats.failed_resets,
        connected = report.stats.table.connected,
        "Shutting down"
    );

    Ok(())
}
