//! Binary RPC contract between the gateway and its workers.
//!
//! Messages are `prost` structs (field-tag encoding) carried over NATS
//! request/reply. A worker implements [`RpcHandler`] and is hosted by the
//! generic [`WorkerService`], which owns the subscription loop.
//!
//! # Architecture
//!
//! ```text
//! Gateway --request {prefix}.{service}.{method}--> NATS --> WorkerService<H>
//!                                                              |
//!                                                     H::handle(method, bytes)
//!                                                              |
//! Gateway <------------------- reply inbox <------------------ +
//! ```
//!
//! # Adding a Worker
//!
//! ```ignore
//! use worker_rpc::{RpcHandler, WorkerService, Result};
//!
//! pub struct EchoHandler;
//!
//! impl RpcHandler for EchoHandler {
//!     const SERVICE: &'static str = "echo";
//!
//!     fn handle(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
//!         Ok(payload.to_vec())
//!     }
//! }
//! ```

pub mod error;
pub mod schema;
pub mod service;
pub mod subjects;
pub mod traits;

pub use error::{Error, Result};
pub use schema::{
    AudioRequest, AudioResponse, HealthRequest, HealthResponse, Language, LanguagesRequest,
    LanguagesResponse, TranslateRequest, TranslateResponse,
};
pub use service::{shutdown_signal, WorkerService, WorkerServiceBuilder};
pub use subjects::Subjects;
pub use traits::RpcHandler;
