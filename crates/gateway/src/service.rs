//! Gateway core: validates a client request, calls the worker, records the
//! two-hop comparison and assembles the combined response.

use crate::config::GatewayLimits;
use crate::error::{GatewayError, Result};
use crate::protocol::{
    Category, HealthResponse, HistoryResponse, LanguageInfo, LanguagesResponse, MetricsResponse,
    PerformanceReport, SendAudioRequest, SendAudioResponse, SendTextRequest, SendTextResponse,
    SetLanguageRequest, SetLanguageResponse, WorkerHealth,
};
use crate::recorder::{MetricsRecorder, PerformanceSample};
use crate::session::{HistoryEntry, HistoryPayload, SessionStore, DEFAULT_LANGUAGE};
use crate::sizing;
use crate::worker::WorkerClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use metrics::{counter, histogram};
use prost::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use worker_rpc::subjects::{AUDIO_SERVICE, TRANSLATE_SERVICE};
use worker_rpc::{AudioRequest, TranslateRequest};

/// Target language for text requests when neither the request nor the
/// user's stored preference names one.
pub const FALLBACK_TARGET_LANGUAGE: &str = "es";

pub const DEFAULT_AUDIO_FORMAT: &str = "wav";

pub const AUDIO_NOTE: &str = "Audio savings come from sending raw bytes on the worker hop \
instead of base64 text, which inflates the payload by 4:3. Text savings come from compact \
field-tag encoding replacing JSON field names.";

/// Timings of one request, taken around the whole handler and around the
/// worker call alone.
struct HopTimings {
    total: Duration,
    worker: Duration,
}

impl HopTimings {
    fn report(
        &self,
        gateway_bytes: usize,
        worker_bytes: usize,
        measured_bytes: usize,
    ) -> PerformanceReport {
        let (overhead, clock_anomaly) = match self.total.checked_sub(self.worker) {
            Some(overhead) => (overhead, false),
            None => (Duration::ZERO, true),
        };
        if clock_anomaly {
            warn!(
                "Worker hop ({:?}) exceeded total request time ({:?}); overhead clamped to 0",
                self.worker, self.total
            );
        }

        PerformanceReport {
            total_time_ms: millis(self.total),
            worker_time_ms: millis(self.worker),
            gateway_overhead_ms: millis(overhead),
            clock_anomaly,
            gateway_payload_bytes: gateway_bytes,
            worker_payload_bytes: worker_bytes,
            worker_payload_measured_bytes: measured_bytes,
            size_reduction: sizing::size_reduction(gateway_bytes, worker_bytes),
        }
    }
}

pub(crate) fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Blank or missing source language means English.
fn resolve_source(source: &str) -> String {
    Some(source.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Orchestrates every client-facing operation.
///
/// Holds the worker client and the injected stores. Cheap to share behind an
/// `Arc`; no locks are held across a worker call.
pub struct GatewayService {
    workers: Arc<dyn WorkerClient>,
    sessions: SessionStore,
    recorder: Arc<MetricsRecorder>,
    limits: GatewayLimits,
}

impl GatewayService {
    pub fn new(
        workers: Arc<dyn WorkerClient>,
        sessions: SessionStore,
        recorder: Arc<MetricsRecorder>,
        limits: GatewayLimits,
    ) -> Self {
        Self {
            workers,
            sessions,
            recorder,
            limits,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn recorder(&self) -> &MetricsRecorder {
        &self.recorder
    }

    pub fn limits(&self) -> &GatewayLimits {
        &self.limits
    }

    pub fn set_language(&self, req: SetLanguageRequest) -> Result<SetLanguageResponse> {
        require(&req.user_id, "userId")?;
        require(&req.language, "language")?;

        self.sessions.set_language(&req.user_id, &req.language);
        info!("User {} preferred language set to {}", req.user_id, req.language);

        Ok(SetLanguageResponse {
            success: true,
            message: format!("Language preference set to {}", req.language),
            user_id: req.user_id,
            language: req.language,
        })
    }

    /// Translate one text message and report the hop comparison.
    pub async fn send_text(&self, req: SendTextRequest) -> Result<SendTextResponse> {
        let started = Instant::now();
        counter!("gateway_requests_total", "category" => Category::Text.as_str()).increment(1);

        require(&req.user_id, "userId")?;
        require(&req.text, "text")?;

        let source_language = resolve_source(&req.source_language);
        let target_language = req
            .target_language
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.sessions.preferred_language(&req.user_id))
            .unwrap_or_else(|| FALLBACK_TARGET_LANGUAGE.to_string());

        let gateway_bytes = sizing::json_size(&req)?;
        let worker_bytes = sizing::estimate_text_worker_bytes(gateway_bytes);

        let rpc = TranslateRequest {
            text: req.text.clone(),
            source_language: source_language.clone(),
            target_language: target_language.clone(),
            user_id: req.user_id.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let measured_bytes = rpc.encoded_len();

        let worker_started = Instant::now();
        let reply = self.workers.translate(rpc).await;
        let worker_elapsed = worker_started.elapsed();

        let reply = reply.inspect_err(|_| self.count_failure(Category::Text))?;
        if !reply.success {
            self.count_failure(Category::Text);
            return Err(GatewayError::WorkerUnavailable(format!(
                "translate worker rejected request: {}",
                reply.error_message
            )));
        }

        let entry = HistoryEntry::new(
            &req.user_id,
            &source_language,
            &target_language,
            HistoryPayload::Text {
                original_text: req.text.clone(),
                translated_text: reply.translated_text.clone(),
            },
        );
        let message_id = entry.id;
        self.sessions.append_history(entry);

        let timings = HopTimings {
            total: started.elapsed(),
            worker: worker_elapsed,
        };
        self.record(Category::Text, &timings, gateway_bytes, worker_bytes);
        let performance = timings.report(gateway_bytes, worker_bytes, measured_bytes);

        debug!(
            "Text {} for {}: {}->{} in {:.2}ms",
            message_id, req.user_id, source_language, target_language, performance.total_time_ms
        );

        Ok(SendTextResponse {
            success: true,
            message_id,
            original_text: req.text,
            translated_text: reply.translated_text,
            source_language,
            target_language,
            performance,
        })
    }

    /// Process one base64 audio clip and report the hop comparison.
    pub async fn send_audio(&self, req: SendAudioRequest) -> Result<SendAudioResponse> {
        let started = Instant::now();
        counter!("gateway_requests_total", "category" => Category::Audio.as_str()).increment(1);

        require(&req.user_id, "userId")?;
        let encoded = req.audio_data.trim();
        if encoded.is_empty() {
            return Err(GatewayError::Validation("audioData is required".into()));
        }

        let max = self.limits.max_audio_bytes;
        // base64 decodes to at most 3 bytes per 4 chars, minus up to 2 padding bytes
        if sizing::decoded_len_upper_bound(encoded.len()) > max + 2 {
            return Err(GatewayError::PayloadTooLarge(format!(
                "audio exceeds the {} byte limit",
                max
            )));
        }
        let audio = BASE64
            .decode(encoded)
            .map_err(|e| GatewayError::Validation(format!("audioData is not valid base64: {}", e)))?;
        if audio.is_empty() {
            return Err(GatewayError::Validation("audioData is empty".into()));
        }
        if audio.len() > max {
            return Err(GatewayError::PayloadTooLarge(format!(
                "audio is {} bytes, limit is {}",
                audio.len(),
                max
            )));
        }

        let original_size = audio.len();
        let gateway_bytes = sizing::audio_gateway_bytes(original_size);
        let worker_bytes = sizing::audio_worker_bytes(original_size);

        let format = req
            .format
            .clone()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIO_FORMAT.to_string());
        let source_language = resolve_source(&req.source_language);
        let target_language = req
            .target_language
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.sessions.get_language(&req.user_id));

        let rpc = AudioRequest {
            audio_data: audio,
            source_language: source_language.clone(),
            target_language: target_language.clone(),
            format: format.clone(),
        };
        let measured_bytes = rpc.encoded_len();

        let worker_started = Instant::now();
        let reply = self.workers.process_audio(rpc).await;
        let worker_elapsed = worker_started.elapsed();

        let reply = reply.inspect_err(|_| self.count_failure(Category::Audio))?;
        if !reply.success {
            self.count_failure(Category::Audio);
            return Err(GatewayError::WorkerUnavailable(format!(
                "audio worker rejected request: {}",
                reply.error_message
            )));
        }

        let processed_size = reply.processed_audio.len();
        let processed_audio = BASE64.encode(&reply.processed_audio);

        let entry = HistoryEntry::new(
            &req.user_id,
            &source_language,
            &target_language,
            HistoryPayload::Audio {
                original_size_bytes: original_size,
                processed_size_bytes: processed_size,
            },
        );
        let message_id = entry.id;
        self.sessions.append_history(entry);

        let timings = HopTimings {
            total: started.elapsed(),
            worker: worker_elapsed,
        };
        self.record(Category::Audio, &timings, gateway_bytes, worker_bytes);
        let performance = timings.report(gateway_bytes, worker_bytes, measured_bytes);

        debug!(
            "Audio {} for {}: {} -> {} bytes in {:.2}ms",
            message_id, req.user_id, original_size, processed_size, performance.total_time_ms
        );

        Ok(SendAudioResponse {
            success: true,
            message_id,
            original_size,
            processed_size,
            processed_audio,
            format,
            source_language,
            target_language,
            performance,
            note: AUDIO_NOTE.to_string(),
        })
    }

    /// Most recent history entries, oldest first. `limit` defaults to the
    /// configured value and is capped at the configured maximum.
    pub fn history(&self, user_id: Option<&str>, limit: Option<usize>) -> Result<HistoryResponse> {
        let limit = match limit {
            Some(0) => return Err(GatewayError::Validation("limit must be at least 1".into())),
            Some(n) => n.min(self.limits.max_history_limit),
            None => self.limits.default_history_limit,
        };
        let user_id = user_id.filter(|u| !u.trim().is_empty());

        let entries = self.sessions.query_history(user_id, limit);
        Ok(HistoryResponse {
            success: true,
            count: entries.len(),
            entries,
        })
    }

    pub fn metrics(&self) -> MetricsResponse {
        MetricsResponse {
            success: true,
            metrics: self.recorder.snapshot(),
        }
    }

    pub async fn languages(&self) -> Result<LanguagesResponse> {
        let reply = self.workers.supported_languages().await?;
        Ok(LanguagesResponse {
            success: true,
            languages: reply
                .languages
                .into_iter()
                .map(|l| LanguageInfo {
                    code: l.code,
                    name: l.name,
                })
                .collect(),
        })
    }

    /// Probe both workers concurrently.
    pub async fn health(&self) -> HealthResponse {
        let (translate, audio) = tokio::join!(
            self.workers.health_check(TRANSLATE_SERVICE),
            self.workers.health_check(AUDIO_SERVICE)
        );
        let status = if translate && audio { "ok" } else { "degraded" };
        HealthResponse {
            status: status.to_string(),
            workers: WorkerHealth { translate, audio },
        }
    }

    fn record(
        &self,
        category: Category,
        timings: &HopTimings,
        gateway_bytes: usize,
        worker_bytes: usize,
    ) {
        self.recorder.record_pair(
            category,
            PerformanceSample {
                elapsed_ms: millis(timings.total),
                payload_bytes: gateway_bytes,
            },
            PerformanceSample {
                elapsed_ms: millis(timings.worker),
                payload_bytes: worker_bytes,
            },
        );
        histogram!("gateway_request_seconds", "category" => category.as_str())
            .record(timings.total.as_secs_f64());
    }

    fn count_failure(&self, category: Category) {
        counter!("gateway_worker_failures_total", "category" => category.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Hop;
    use crate::worker::testing::{local_workers, DownWorkers};

    fn service_with(workers: Arc<dyn WorkerClient>) -> GatewayService {
        GatewayService::new(
            workers,
            SessionStore::new(),
            Arc::new(MetricsRecorder::new()),
            GatewayLimits::default(),
        )
    }

    fn text(user: &str, text: &str, target: Option<&str>) -> SendTextRequest {
        SendTextRequest {
            user_id: user.into(),
            text: text.into(),
            source_language: "en".into(),
            target_language: target.map(str::to_string),
        }
    }

    fn audio(user: &str, raw: &[u8]) -> SendAudioRequest {
        SendAudioRequest {
            user_id: user.into(),
            audio_data: BASE64.encode(raw),
            format: None,
            source_language: "en".into(),
            target_language: None,
        }
    }

    #[test]
    fn test_overhead_clamped_on_clock_anomaly() {
        let timings = HopTimings {
            total: Duration::from_millis(5),
            worker: Duration::from_millis(8),
        };
        let report = timings.report(100, 60, 40);
        assert!(report.clock_anomaly);
        assert_eq!(report.gateway_overhead_ms, 0.0);

        let timings = HopTimings {
            total: Duration::from_millis(8),
            worker: Duration::from_millis(5),
        };
        let report = timings.report(100, 60, 40);
        assert!(!report.clock_anomaly);
        assert!((report.gateway_overhead_ms - 3.0).abs() < 1e-9);
        assert_eq!(report.size_reduction, "40.0%");
    }

    #[tokio::test]
    async fn test_send_text_translates_and_records() {
        let service = service_with(local_workers());
        let resp = service.send_text(text("u1", "hello", Some("es"))).await.unwrap();

        assert!(resp.success);
        assert_eq!(resp.translated_text, "hola");
        assert_eq!(resp.target_language, "es");

        let perf = &resp.performance;
        let expected_gateway = sizing::json_size(&text("u1", "hello", Some("es"))).unwrap();
        assert_eq!(perf.gateway_payload_bytes, expected_gateway);
        assert_eq!(
            perf.worker_payload_bytes,
            sizing::estimate_text_worker_bytes(expected_gateway)
        );
        assert!(perf.worker_payload_bytes < perf.gateway_payload_bytes);
        assert!(perf.worker_payload_measured_bytes > 0);
        assert!(perf.total_time_ms >= perf.worker_time_ms);

        assert_eq!(service.recorder().count(Category::Text, Hop::Gateway), 1);
        assert_eq!(service.recorder().count(Category::Text, Hop::Worker), 1);
        assert_eq!(service.sessions().history_len(), 1);
    }

    #[tokio::test]
    async fn test_send_text_target_resolution() {
        let service = service_with(local_workers());

        let resp = service.send_text(text("u1", "hello", None)).await.unwrap();
        assert_eq!(resp.target_language, FALLBACK_TARGET_LANGUAGE);

        service
            .set_language(SetLanguageRequest {
                user_id: "u1".into(),
                language: "fr".into(),
            })
            .unwrap();
        let resp = service.send_text(text("u1", "hello", None)).await.unwrap();
        assert_eq!(resp.target_language, "fr");
        assert_eq!(resp.translated_text, "bonjour");

        let resp = service.send_text(text("u1", "hello", Some("de"))).await.unwrap();
        assert_eq!(resp.target_language, "de");
    }

    #[tokio::test]
    async fn test_blank_source_language_defaults_to_english() {
        let service = service_with(local_workers());

        let mut req = text("u1", "hello", Some("es"));
        req.source_language = "  ".into();
        let resp = service.send_text(req).await.unwrap();
        assert_eq!(resp.source_language, "en");
        assert_eq!(resp.translated_text, "hola");

        let mut req = audio("u1", &[1, 2, 3]);
        req.source_language = String::new();
        let resp = service.send_audio(req).await.unwrap();
        assert_eq!(resp.source_language, "en");

        let history = service.history(Some("u1"), None).unwrap();
        assert_eq!(history.count, 2);
        assert!(history.entries.iter().all(|e| e.source_language == "en"));
    }

    #[tokio::test]
    async fn test_send_text_validation() {
        let service = service_with(local_workers());
        for req in [text("", "hello", None), text("u1", "   ", None)] {
            let err = service.send_text(req).await.unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)));
        }
        assert_eq!(service.sessions().history_len(), 0);
        assert_eq!(service.recorder().count(Category::Text, Hop::Gateway), 0);
    }

    #[tokio::test]
    async fn test_worker_failure_has_no_side_effects() {
        let service = service_with(Arc::new(DownWorkers));
        let err = service.send_text(text("u1", "hello", None)).await.unwrap_err();
        assert!(matches!(err, GatewayError::WorkerUnavailable(_)));

        let err = service.send_audio(audio("u1", &[1, 2, 3])).await.unwrap_err();
        assert!(matches!(err, GatewayError::WorkerUnavailable(_)));

        assert_eq!(service.sessions().history_len(), 0);
        let snapshot = service.metrics().metrics;
        assert_eq!(snapshot.text.gateway.count, 0);
        assert_eq!(snapshot.audio.gateway.count, 0);
    }

    #[tokio::test]
    async fn test_send_audio_sizes() {
        let service = service_with(local_workers());
        let resp = service.send_audio(audio("u1", &vec![7u8; 10240])).await.unwrap();

        assert_eq!(resp.original_size, 10240);
        assert_eq!(resp.processed_size, 10240 + 44);
        assert_eq!(resp.format, "wav");
        assert_eq!(resp.note, AUDIO_NOTE);
        assert_eq!(resp.performance.gateway_payload_bytes, 13756);
        assert_eq!(resp.performance.worker_payload_bytes, 10260);
        assert_eq!(resp.performance.size_reduction, "25.4%");

        let processed = BASE64.decode(&resp.processed_audio).unwrap();
        assert_eq!(processed.len(), resp.processed_size);
        assert_eq!(&processed[..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_send_audio_rejections() {
        let limits = GatewayLimits {
            max_audio_bytes: 16,
            ..GatewayLimits::default()
        };
        let service = GatewayService::new(
            local_workers(),
            SessionStore::new(),
            Arc::new(MetricsRecorder::new()),
            limits,
        );

        let err = service.send_audio(audio("u1", &[0u8; 17])).await.unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge(_)));

        let err = service.send_audio(audio("u1", &[0u8; 64])).await.unwrap_err();
        assert!(matches!(err, GatewayError::PayloadTooLarge(_)));

        let mut bad = audio("u1", &[1, 2, 3]);
        bad.audio_data = "not base64!".into();
        let err = service.send_audio(bad).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        let mut empty = audio("u1", &[]);
        empty.audio_data.clear();
        let err = service.send_audio(empty).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        assert!(service.send_audio(audio("u1", &[0u8; 16])).await.is_ok());
    }

    #[tokio::test]
    async fn test_history_limit() {
        let service = service_with(local_workers());
        service.send_text(text("u1", "hello", None)).await.unwrap();
        service.send_text(text("u1", "goodbye", None)).await.unwrap();

        let resp = service.history(Some("u1"), Some(1)).unwrap();
        assert_eq!(resp.count, 1);
        assert!(matches!(
            &resp.entries[0].payload,
            HistoryPayload::Text { original_text, .. } if original_text == "goodbye"
        ));

        assert_eq!(service.history(None, None).unwrap().count, 2);
        assert!(matches!(
            service.history(None, Some(0)),
            Err(GatewayError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_languages_and_health() {
        let service = service_with(local_workers());
        let langs = service.languages().await.unwrap();
        assert!(langs.languages.iter().any(|l| l.code == "es"));

        let health = service.health().await;
        assert_eq!(health.status, "ok");
        assert!(health.workers.translate && health.workers.audio);

        let down = service_with(Arc::new(DownWorkers));
        let health = down.health().await;
        assert_eq!(health.status, "degraded");
        assert!(matches!(
            down.languages().await,
            Err(GatewayError::WorkerUnavailable(_))
        ));
    }
}
