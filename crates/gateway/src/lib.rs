//! Protocol-comparison gateway.
//!
//! Clients talk JSON over HTTP; the gateway forwards each request to a worker
//! over prost-encoded NATS request/reply and reports how the two hops compare
//! in size and latency.
//!
//! ## Architecture
//!
//! ```text
//! HTTP/JSON client
//!         ↓
//! api (axum Router)
//!         ↓
//! GatewayService ──→ SessionStore (preferences, history)
//!         │      ──→ MetricsRecorder (per-hop samples)
//!         ↓
//! WorkerClient ──prost over NATS──→ translate / audio workers
//! ```
//!
//! The stores are owned by the service and injected at construction. No lock
//! is held across a worker call.

pub mod api;
pub mod batch;
pub mod config;
pub mod error;
pub mod protocol;
pub mod recorder;
pub mod service;
pub mod session;
pub mod sizing;
pub mod worker;

pub use api::{create_router, AppState};
pub use batch::BatchRunner;
pub use config::{ConfigError, GatewayConfig, GatewayLimits};
pub use error::{ErrorKind, GatewayError, Result};
pub use recorder::{AggregateMetrics, MetricsRecorder, PerformanceSample};
pub use service::GatewayService;
pub use session::{HistoryEntry, HistoryPayload, SessionStore};
pub use worker::{InProcessTransport, NatsWorkerClient, RpcTransport, RpcWorkerClient, WorkerClient};
