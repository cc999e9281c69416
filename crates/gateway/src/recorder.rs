//! In-memory performance sample recorder.
//!
//! Samples are appended per (category, hop) and averaged on demand. Nothing
//! is cached: every snapshot walks the full history.

use crate::protocol::{Category, Hop};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Reported when a ratio has no meaningful denominator.
pub const NO_DATA: &str = "No data";

/// One measurement of one hop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSample {
    pub elapsed_ms: f64,
    pub payload_bytes: usize,
}

/// Averages over every sample of one (category, hop).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HopStats {
    pub count: usize,
    pub avg_time_ms: f64,
    pub avg_payload_bytes: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub gateway: HopStats,
    pub worker: HopStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Gateway-hop avg time over worker-hop avg time, e.g. "3.21x".
    pub text_speed_improvement: String,
    pub text_size_reduction: String,
    pub audio_speed_improvement: String,
    pub audio_size_reduction: String,
}

/// Derived view over all recorded samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub text: CategoryMetrics,
    pub audio: CategoryMetrics,
    pub analysis: Analysis,
}

type SampleKey = (Category, Hop);

/// Thread-safe append-only sample store.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    samples: RwLock<HashMap<SampleKey, Vec<PerformanceSample>>>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample.
    pub fn record(&self, category: Category, hop: Hop, sample: PerformanceSample) {
        let mut samples = self.samples.write().unwrap_or_else(PoisonError::into_inner);
        samples.entry((category, hop)).or_default().push(sample);
    }

    /// Append the gateway and worker samples of one request together, so
    /// both hops of a category always hold the same number of samples.
    pub fn record_pair(
        &self,
        category: Category,
        gateway: PerformanceSample,
        worker: PerformanceSample,
    ) {
        let mut samples = self.samples.write().unwrap_or_else(PoisonError::into_inner);
        samples
            .entry((category, Hop::Gateway))
            .or_default()
            .push(gateway);
        samples
            .entry((category, Hop::Worker))
            .or_default()
            .push(worker);
    }

    /// Number of samples recorded for one (category, hop).
    pub fn count(&self, category: Category, hop: Hop) -> usize {
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);
        samples.get(&(category, hop)).map_or(0, Vec::len)
    }

    /// Compute averages over the full sample history.
    pub fn snapshot(&self) -> AggregateMetrics {
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);
        let stats = |category, hop| hop_stats(samples.get(&(category, hop)).map(Vec::as_slice));

        let text = CategoryMetrics {
            gateway: stats(Category::Text, Hop::Gateway),
            worker: stats(Category::Text, Hop::Worker),
        };
        let audio = CategoryMetrics {
            gateway: stats(Category::Audio, Hop::Gateway),
            worker: stats(Category::Audio, Hop::Worker),
        };
        drop(samples);

        let analysis = Analysis {
            text_speed_improvement: speed_improvement(&text),
            text_size_reduction: size_reduction(&text),
            audio_speed_improvement: speed_improvement(&audio),
            audio_size_reduction: size_reduction(&audio),
        };

        AggregateMetrics {
            text,
            audio,
            analysis,
        }
    }
}

fn hop_stats(samples: Option<&[PerformanceSample]>) -> HopStats {
    let samples = samples.unwrap_or_default();
    if samples.is_empty() {
        return HopStats::default();
    }

    let count = samples.len();
    let (time, bytes) = samples.iter().fold((0.0, 0.0), |(t, b), s| {
        (t + s.elapsed_ms, b + s.payload_bytes as f64)
    });

    HopStats {
        count,
        avg_time_ms: time / count as f64,
        avg_payload_bytes: bytes / count as f64,
    }
}

/// Gateway average over worker average, or "No data" when the worker
/// average is zero.
pub fn speed_improvement(metrics: &CategoryMetrics) -> String {
    if metrics.worker.avg_time_ms <= 0.0 {
        return NO_DATA.to_string();
    }
    format!(
        "{:.2}x",
        metrics.gateway.avg_time_ms / metrics.worker.avg_time_ms
    )
}

/// Average payload reduction from gateway hop to worker hop.
pub fn size_reduction(metrics: &CategoryMetrics) -> String {
    if metrics.gateway.avg_payload_bytes <= 0.0 {
        return NO_DATA.to_string();
    }
    let pct = (1.0 - metrics.worker.avg_payload_bytes / metrics.gateway.avg_payload_bytes) * 100.0;
    format!("{:.1}%", pct.clamp(0.0, 100.0))
}
