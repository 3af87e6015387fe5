//! Shortener gateway binary

use anyhow::Context;
use shortener_core::ShortenerConfig;
use shortener_gateway::{GatewayConfig, GatewayService};
use shortener_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("failed to initialize telemetry")?;

    let shortener_config = ShortenerConfig::from_env().context("invalid shortener configuration")?;
    let gateway_config = GatewayConfig::from_env().context("invalid gateway configuration")?;

    info!(
        bucket = %shortener_config.bucket_name,
        environment = %shortener_config.environment,
        threshold = shortener_config.policy.threshold(),
        url_expiration_secs = shortener_config.url_expiration_secs,
        "starting shortener gateway"
    );

    GatewayService::build(gateway_config, shortener_config)
        .await?
        .run(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
