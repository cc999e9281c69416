//! Generic worker service that hosts any [`RpcHandler`].
//! Uses a NATS Core queue subscription for low-latency request delivery.

use crate::error::Result;
use crate::schema::HealthResponse;
use crate::subjects::{method_of, Subjects, METHOD_HEALTH};
use crate::traits::RpcHandler;
use bytes::Bytes;
use futures::StreamExt;
use metrics::{counter, histogram};
use nats_client::NatsClient;
use prost::Message;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Generic worker service.
///
/// Subscribes to `{prefix}.{H::SERVICE}.*` and answers each request on its
/// reply inbox. Requests are handled on spawned tasks so slow calls do not
/// hold up the subscription.
pub struct WorkerService<H: RpcHandler> {
    handler: Arc<H>,
    nats_client: NatsClient,
    subjects: Subjects,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<H: RpcHandler> WorkerService<H> {
    pub fn new(
        handler: H,
        nats_client: NatsClient,
        subjects: Subjects,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            nats_client,
            subjects,
            shutdown_rx,
        }
    }

    /// Run the service until shutdown or until the subscription ends.
    pub async fn run(mut self) -> Result<()> {
        let subject = self.subjects.service_wildcard(H::SERVICE);
        info!("Starting {} worker, subscribing to {}", H::SERVICE, subject);

        let mut subscriber = self
            .nats_client
            .queue_subscribe(&subject, H::SERVICE)
            .await?;

        info!("{} worker running", H::SERVICE);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("{} worker received shutdown signal", H::SERVICE);
                    break;
                }

                msg = subscriber.next() => {
                    match msg {
                        Some(nats_msg) => {
                            let Some(reply) = nats_msg.reply.clone() else {
                                warn!("[{}] Dropping request on {} without reply inbox", H::SERVICE, nats_msg.subject);
                                continue;
                            };

                            let handler = self.handler.clone();
                            let nats_client = self.nats_client.clone();
                            let subject = nats_msg.subject.to_string();
                            let payload = nats_msg.payload;

                            tokio::spawn(async move {
                                let reply_payload = dispatch(handler.as_ref(), &subject, &payload);
                                if let Err(e) = nats_client.publish(reply.to_string(), reply_payload).await {
                                    error!("[{}] Failed to publish reply: {:?}", H::SERVICE, e);
                                }
                            });
                        }
                        None => {
                            warn!("[{}] Subscription ended unexpectedly", H::SERVICE);
                            break;
                        }
                    }
                }
            }
        }

        self.nats_client.flush().await?;
        info!("{} worker stopped", H::SERVICE);
        Ok(())
    }
}

/// Route one request to the handler and encode the reply.
///
/// Health probes are answered here. A handler error yields an empty reply,
/// which decodes on the caller side as a default message with
/// `success = false`.
pub fn dispatch<H: RpcHandler>(handler: &H, subject: &str, payload: &[u8]) -> Bytes {
    let method = method_of(subject);
    let started = Instant::now();

    counter!(
        "worker_requests_total",
        "service" => H::SERVICE,
        "method" => method.to_string()
    )
    .increment(1);

    if method == METHOD_HEALTH {
        let health = HealthResponse {
            service: H::SERVICE.to_string(),
            ok: true,
        };
        return Bytes::from(health.encode_to_vec());
    }

    let reply = match handler.handle(method, payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("[{}] Failed to handle {}: {}", H::SERVICE, subject, e);
            counter!(
                "worker_errors_total",
                "service" => H::SERVICE,
                "method" => method.to_string()
            )
            .increment(1);
            Vec::new()
        }
    };

    histogram!("worker_handle_seconds", "service" => H::SERVICE)
        .record(started.elapsed().as_secs_f64());
    debug!(
        "[{}] {} handled ({} -> {} bytes)",
        H::SERVICE,
        method,
        payload.len(),
        reply.len()
    );

    Bytes::from(reply)
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}

/// Builder for worker services with a custom subject prefix.
pub struct WorkerServiceBuilder<H: RpcHandler> {
    handler: H,
    subjects: Subjects,
}

impl<H: RpcHandler> WorkerServiceBuilder<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            subjects: Subjects::default(),
        }
    }

    /// Set the subject prefix (default "worker").
    pub fn subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subjects = Subjects::new(prefix);
        self
    }

    pub fn build(self, nats_client: NatsClient, shutdown_rx: mpsc::Receiver<()>) -> WorkerService<H> {
        WorkerService::new(self.handler, nats_client, self.subjects, shutdown_rx)
    }
}
