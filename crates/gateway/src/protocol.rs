//! JSON message types for the client-facing HTTP API.
//!
//! Field names are camelCase on the wire.

use crate::recorder::AggregateMetrics;
use crate::session::HistoryEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_source_language() -> String {
    "en".to_string()
}

// ============================================================================
// Shared tags
// ============================================================================

/// Request category a performance sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Audio,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Audio => "audio",
        }
    }
}

/// Leg of the request path a sample was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hop {
    /// Client to gateway, JSON encoded.
    Gateway,
    /// Gateway to worker, binary encoded.
    Worker,
}

// ============================================================================
// Client → Gateway
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLanguageRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAudioRequest {
    #[serde(default)]
    pub user_id: String,
    /// Base64-encoded audio clip.
    #[serde(default)]
    pub audio_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub count: usize,
}

// ============================================================================
// Gateway → Client
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLanguageResponse {
    pub success: bool,
    pub user_id: String,
    pub language: String,
    pub message: String,
}

/// Timing and size comparison between the two hops of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Whole request lifetime inside the gateway.
    pub total_time_ms: f64,
    /// Time spent waiting on the worker RPC.
    pub worker_time_ms: f64,
    /// `total - worker`, never negative.
    pub gateway_overhead_ms: f64,
    /// Set when the overhead had to be clamped to zero.
    pub clock_anomaly: bool,
    /// Bytes of the JSON request as received by the gateway.
    pub gateway_payload_bytes: usize,
    /// Estimated bytes of the same request on the binary hop.
    pub worker_payload_bytes: usize,
    /// Actual encoded length of the outbound RPC message.
    pub worker_payload_measured_bytes: usize,
    /// `(1 - worker/gateway) * 100`, one decimal place, e.g. "40.0%".
    pub size_reduction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextResponse {
    pub success: bool,
    pub message_id: Uuid,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub performance: PerformanceReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAudioResponse {
    pub success: bool,
    pub message_id: Uuid,
    pub original_size: usize,
    pub processed_size: usize,
    /// Base64-encoded processed clip.
    pub processed_audio: String,
    pub format: String,
    pub source_language: String,
    pub target_language: String,
    pub performance: PerformanceReport,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub success: bool,
    pub count: usize,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub success: bool,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<LanguageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub index: usize,
    pub result: String,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    pub count: usize,
    pub total_time_ms: f64,
    pub average_time_ms: f64,
    pub results: Vec<BatchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealth {
    pub translate: bool,
    pub audio: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" when every worker answered, "degraded" otherwise.
    pub status: String,
    pub workers: WorkerHealth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_text_defaults() {
        let req: SendTextRequest = serde_json::from_str(r#"{"userId":"u1","text":"hi"}"#).unwrap();
        assert_eq!(req.source_language, "en");
        assert!(req.target_language.is_none());

        let req: SendTextRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_id.is_empty());
        assert!(req.text.is_empty());
    }

    #[test]
    fn test_canonical_serialization_skips_absent_target() {
        let req = SendTextRequest {
            user_id: "u1".into(),
            text: "hello".into(),
            source_language: "en".into(),
            target_language: None,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"userId":"u1","text":"hello","sourceLanguage":"en"}"#
        );
    }

    #[test]
    fn test_history_query_camel_case() {
        let q: HistoryQuery = serde_json::from_str(r#"{"userId":"u1","limit":3}"#).unwrap();
        assert_eq!(q.user_id.as_deref(), Some("u1"));
        assert_eq!(q.limit, Some(3));
    }
}
