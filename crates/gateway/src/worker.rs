//! Client side of the worker RPC.
//!
//! [`WorkerClient`] is the seam the gateway core talks to. [`RpcWorkerClient`]
//! implements it over any [`RpcTransport`]: NATS request/reply in production,
//! or [`InProcessTransport`] which calls worker handlers directly.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use metrics::{counter, histogram};
use nats_client::NatsClient;
use prost::Message;
use std::time::Instant;
use tracing::{debug, warn};
use worker_rpc::service::dispatch;
use worker_rpc::subjects::{AUDIO_SERVICE, TRANSLATE_SERVICE};
use worker_rpc::{
    AudioRequest, AudioResponse, HealthRequest, HealthResponse, LanguagesRequest,
    LanguagesResponse, RpcHandler, Subjects, TranslateRequest, TranslateResponse,
};

/// Operations the gateway needs from its workers.
///
/// Responses are returned as sent by the worker; `success = false` replies
/// are interpreted by the caller.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    async fn translate(&self, req: TranslateRequest) -> Result<TranslateResponse>;

    async fn process_audio(&self, req: AudioRequest) -> Result<AudioResponse>;

    async fn supported_languages(&self) -> Result<LanguagesResponse>;

    /// Whether `service` answered a health probe.
    async fn health_check(&self, service: &str) -> bool;
}

/// Byte-level request/reply transport.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, subject: &str, payload: Bytes) -> anyhow::Result<Bytes>;
}

#[async_trait]
impl RpcTransport for NatsClient {
    async fn request(&self, subject: &str, payload: Bytes) -> anyhow::Result<Bytes> {
        NatsClient::request(self, subject, payload).await
    }
}

/// Calls a translate and an audio handler in process, through the same
/// dispatch path a hosted worker uses.
pub struct InProcessTransport<T: RpcHandler, A: RpcHandler> {
    subjects: Subjects,
    translate: T,
    audio: A,
}

impl<T: RpcHandler, A: RpcHandler> InProcessTransport<T, A> {
    pub fn new(subjects: Subjects, translate: T, audio: A) -> Self {
        Self {
            subjects,
            translate,
            audio,
        }
    }

    fn service_of<'a>(&self, subject: &'a str) -> Option<&'a str> {
        let rest = subject
            .strip_prefix(self.subjects.prefix())?
            .strip_prefix('.')?;
        rest.split_once('.').map(|(service, _)| service)
    }
}

#[async_trait]
impl<T: RpcHandler, A: RpcHandler> RpcTransport for InProcessTransport<T, A> {
    async fn request(&self, subject: &str, payload: Bytes) -> anyhow::Result<Bytes> {
        match self.service_of(subject) {
            Some(service) if service == T::SERVICE => {
                Ok(dispatch(&self.translate, subject, &payload))
            }
            Some(service) if service == A::SERVICE => Ok(dispatch(&self.audio, subject, &payload)),
            _ => Err(anyhow::anyhow!("no responders for {}", subject)),
        }
    }
}

/// [`WorkerClient`] that encodes requests with prost and sends them over a
/// transport.
pub struct RpcWorkerClient<R: RpcTransport> {
    transport: R,
    subjects: Subjects,
}

impl<R: RpcTransport> RpcWorkerClient<R> {
    pub fn new(transport: R, subjects: Subjects) -> Self {
        Self {
            transport,
            subjects,
        }
    }

    async fn call<Req, Resp>(&self, service: &str, subject: String, req: &Req) -> Result<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let started = Instant::now();
        let payload = Bytes::from(req.encode_to_vec());
        let sent = payload.len();

        let reply = match self.transport.request(&subject, payload).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Worker request to {} failed: {}", subject, e);
                counter!("gateway_worker_errors_total", "service" => service.to_string())
                    .increment(1);
                return Err(GatewayError::WorkerUnavailable(format!(
                    "{} worker: {}",
                    service, e
                )));
            }
        };

        histogram!("gateway_worker_call_seconds", "service" => service.to_string())
            .record(started.elapsed().as_secs_f64());
        debug!("{}: sent {} bytes, received {} bytes", subject, sent, reply.len());

        Resp::decode(reply).map_err(|e| {
            counter!("gateway_worker_errors_total", "service" => service.to_string())
                .increment(1);
            GatewayError::WorkerUnavailable(format!("{} worker sent a bad reply: {}", service, e))
        })
    }
}

/// Production client over NATS.
pub type NatsWorkerClient = RpcWorkerClient<NatsClient>;

#[async_trait]
impl<R: RpcTransport> WorkerClient for RpcWorkerClient<R> {
    async fn translate(&self, req: TranslateRequest) -> Result<TranslateResponse> {
        self.call(TRANSLATE_SERVICE, self.subjects.translate(), &req)
            .await
    }

    async fn process_audio(&self, req: AudioRequest) -> Result<AudioResponse> {
        self.call(AUDIO_SERVICE, self.subjects.process_audio(), &req)
            .await
    }

    async fn supported_languages(&self) -> Result<LanguagesResponse> {
        self.call(
            TRANSLATE_SERVICE,
            self.subjects.languages(),
            &LanguagesRequest {},
        )
        .await
    }

    async fn health_check(&self, service: &str) -> bool {
        let result: Result<HealthResponse> = self
            .call(service, self.subjects.health(service), &HealthRequest {})
            .await;
        matches!(result, Ok(health) if health.ok)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Worker fakes for gateway unit tests.

    use super::*;
    use audio_worker::AudioHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use translate_worker::TranslateHandler;

    pub type LocalWorkers = RpcWorkerClient<InProcessTransport<TranslateHandler, AudioHandler>>;

    /// Real handlers, no network.
    pub fn local_workers() -> Arc<dyn WorkerClient> {
        Arc::new(local())
    }

    pub fn local() -> LocalWorkers {
        let subjects = Subjects::default();
        RpcWorkerClient::new(
            InProcessTransport::new(subjects.clone(), TranslateHandler, AudioHandler),
            subjects,
        )
    }

    /// Every call fails as if no worker were listening.
    pub struct DownWorkers;

    #[async_trait]
    impl WorkerClient for DownWorkers {
        async fn translate(&self, _req: TranslateRequest) -> Result<TranslateResponse> {
            Err(GatewayError::WorkerUnavailable("translate worker: no responders".into()))
        }

        async fn process_audio(&self, _req: AudioRequest) -> Result<AudioResponse> {
            Err(GatewayError::WorkerUnavailable("audio worker: no responders".into()))
        }

        async fn supported_languages(&self) -> Result<LanguagesResponse> {
            Err(GatewayError::WorkerUnavailable("translate worker: no responders".into()))
        }

        async fn health_check(&self, _service: &str) -> bool {
            false
        }
    }

    /// Delegates to the real handlers but fails the translate call whose
    /// text equals `fail_text`. Counts translate calls.
    pub struct FlakyWorkers {
        inner: LocalWorkers,
        fail_text: String,
        pub calls: AtomicUsize,
    }

    impl FlakyWorkers {
        pub fn new(fail_text: impl Into<String>) -> Self {
            Self {
                inner: local(),
                fail_text: fail_text.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WorkerClient for FlakyWorkers {
        async fn translate(&self, req: TranslateRequest) -> Result<TranslateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if req.text == self.fail_text {
                return Err(GatewayError::WorkerUnavailable("translate worker: boom".into()));
            }
            self.inner.translate(req).await
        }

        async fn process_audio(&self, req: AudioRequest) -> Result<AudioResponse> {
            self.inner.process_audio(req).await
        }

        async fn supported_languages(&self) -> Result<LanguagesResponse> {
            self.inner.supported_languages().await
        }

        async fn health_check(&self, service: &str) -> bool {
            self.inner.health_check(service).await
        }
    }
}
