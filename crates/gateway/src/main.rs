//! Gateway service entry point.

use anyhow::Result;
use gateway::{
    create_router, AppState, BatchRunner, GatewayConfig, GatewayService, MetricsRecorder,
    NatsWorkerClient, SessionStore, WorkerClient,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use nats_client::NatsClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worker_rpc::subjects::{AUDIO_SERVICE, TRANSLATE_SERVICE};
use worker_rpc::{shutdown_signal, Subjects};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Gateway service");

    let config = GatewayConfig::load()?;

    info!("Configuration:");
    info!("  NATS_URL: {}", config.nats_url);
    info!("  HTTP_PORT: {}", config.http_port);
    info!("  METRICS_PORT: {}", config.metrics_port);
    info!("  WORKER_SUBJECT_PREFIX: {}", config.worker_subject_prefix);
    info!("  MAX_AUDIO_BYTES: {}", config.limits.max_audio_bytes);
    info!("  MAX_BATCH_SIZE: {}", config.limits.max_batch_size);
    info!("  DEFAULT_HISTORY_LIMIT: {}", config.limits.default_history_limit);

    // Start Prometheus metrics server
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;
    info!("Prometheus metrics server started on port {}", config.metrics_port);

    let nats_client = NatsClient::connect(&config.nats_url).await?;
    info!("Connected to NATS");

    let workers: Arc<dyn WorkerClient> = Arc::new(NatsWorkerClient::new(
        nats_client.clone(),
        Subjects::new(config.worker_subject_prefix.clone()),
    ));

    for service in [TRANSLATE_SERVICE, AUDIO_SERVICE] {
        if !workers.health_check(service).await {
            warn!("{} worker is not answering yet", service);
        }
    }

    let service = Arc::new(GatewayService::new(
        workers.clone(),
        SessionStore::new(),
        Arc::new(MetricsRecorder::new()),
        config.limits,
    ));
    let batch = BatchRunner::new(workers, config.limits.max_batch_size);
    let app = create_router(Arc::new(AppState { service, batch }));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    nats_client.flush().await?;
    info!("Gateway stopped");
    Ok(())
}
