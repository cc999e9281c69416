//! Handler trait implemented by each worker.

use crate::error::Result;

/// A stateless RPC handler hosted by [`crate::WorkerService`].
///
/// `handle` receives the method token of the subject and the raw request
/// bytes, and returns the encoded reply. Business failures belong in the
/// reply message (`success = false`); an `Err` means the request could not
/// be understood at all.
pub trait RpcHandler: Send + Sync + 'static {
    /// Service name, the middle segment of the subject (e.g. "translate").
    const SERVICE: &'static str;

    fn handle(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>>;
}
