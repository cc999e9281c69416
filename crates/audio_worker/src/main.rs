//! Audio worker entry point.
//!
//! Serves `{prefix}.audio.*` over NATS request/reply.

use anyhow::Result;
use audio_worker::AudioHandler;
use metrics_exporter_prometheus::PrometheusBuilder;
use nats_client::NatsClient;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use worker_rpc::{shutdown_signal, WorkerServiceBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting audio worker");

    let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".into());
    let subject_prefix =
        std::env::var("WORKER_SUBJECT_PREFIX").unwrap_or_else(|_| "worker".into());
    let metrics_port: u16 = std::env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9092".into())
        .parse()?;

    info!("Configuration:");
    info!("  NATS_URL: {}", nats_url);
    info!("  WORKER_SUBJECT_PREFIX: {}", subject_prefix);
    info!("  METRICS_PORT: {}", metrics_port);

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()?;
    info!("Prometheus metrics server started on port {}", metrics_port);

    let nats_client = NatsClient::connect(&nats_url).await?;
    info!("Connected to NATS");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    let service = WorkerServiceBuilder::new(AudioHandler::new())
        .subject_prefix(subject_prefix)
        .build(nats_client, shutdown_rx);

    let service_handle = tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Audio worker failed: {:?}", e);
        }
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(()).await;
    let _ = service_handle.await;

    info!("Audio worker stopped");
    Ok(())
}
