//! Concurrent batch runner used to exercise the translate worker under load.

use crate::error::{GatewayError, Result};
use crate::protocol::{BatchItem, BatchResponse};
use crate::service::millis;
use crate::worker::WorkerClient;
use chrono::Utc;
use futures::future::try_join_all;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use worker_rpc::TranslateRequest;

const BATCH_USER_ID: &str = "batch";

/// Synthetic input for item `index`.
pub fn batch_text(index: usize) -> String {
    format!("Test message {}", index)
}

/// Fans out N translate calls and joins them all-or-nothing.
///
/// Batch calls bypass the session store and the metrics recorder.
pub struct BatchRunner {
    workers: Arc<dyn WorkerClient>,
    max_batch_size: usize,
}

impl BatchRunner {
    pub fn new(workers: Arc<dyn WorkerClient>, max_batch_size: usize) -> Self {
        Self {
            workers,
            max_batch_size,
        }
    }

    pub async fn run(&self, count: usize) -> Result<BatchResponse> {
        if count == 0 || count > self.max_batch_size {
            return Err(GatewayError::Validation(format!(
                "count must be between 1 and {}",
                self.max_batch_size
            )));
        }

        info!("Running concurrent batch of {}", count);
        counter!("gateway_batch_runs_total").increment(1);
        let started = Instant::now();

        let calls = (0..count).map(|index| self.run_one(index));
        let results = try_join_all(calls).await.inspect_err(|e| {
            warn!("Batch of {} failed: {}", count, e);
            counter!("gateway_batch_failures_total").increment(1);
        })?;

        let total = started.elapsed();
        histogram!("gateway_batch_seconds").record(total.as_secs_f64());
        let total_time_ms = millis(total);

        Ok(BatchResponse {
            success: true,
            count,
            total_time_ms,
            average_time_ms: total_time_ms / count as f64,
            results,
        })
    }

    async fn run_one(&self, index: usize) -> Result<BatchItem> {
        let started = Instant::now();
        let req = TranslateRequest {
            text: batch_text(index),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            user_id: BATCH_USER_ID.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let fail = |reason: String| GatewayError::BatchPartialFailure { index, reason };
        let reply = self
            .workers
            .translate(req)
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !reply.success {
            return Err(fail(reply.error_message));
        }

        Ok(BatchItem {
            index,
            result: reply.translated_text,
            elapsed_ms: millis(started.elapsed()),
        })
    }
}
