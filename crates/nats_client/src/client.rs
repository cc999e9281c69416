//! NATS client implementation for request/reply RPC.

use anyhow::{anyhow, Result};
use async_nats::Client;
use bytes::Bytes;
use tracing::{debug, info};

pub use async_nats::Subscriber;

/// Wrapper around the NATS core client.
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to a NATS server.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);
        let client = async_nats::connect(url).await?;
        Ok(Self { client })
    }

    /// Subscribe as part of a queue group so several worker replicas share
    /// the load of one subject.
    pub async fn queue_subscribe(&self, subject: &str, queue: &str) -> Result<Subscriber> {
        info!("Subscribing to subject {} (queue group {})", subject, queue);
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue.to_string())
            .await?;
        Ok(subscriber)
    }

    /// Send a request and wait for the single reply payload.
    ///
    /// No timeout is layered on top of the client's own request handling.
    pub async fn request(&self, subject: &str, payload: Bytes) -> Result<Bytes> {
        debug!("Request to {} ({} bytes)", subject, payload.len());
        let reply = self
            .client
            .request(subject.to_string(), payload)
            .await
            .map_err(|e| anyhow!("request to {} failed: {}", subject, e))?;
        Ok(reply.payload)
    }

    /// Publish a payload (fire-and-forget). Used for RPC replies.
    pub async fn publish(&self, subject: impl Into<String>, payload: Bytes) -> Result<()> {
        self.client.publish(subject.into(), payload).await?;
        Ok(())
    }

    /// Flush buffered publishes to the server.
    pub async fn flush(&self) -> Result<()> {
        self.client.flush().await?;
        Ok(())
    }
}
