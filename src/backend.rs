//! GraphBackend trait: the seam between the query adapter and a graph store

use crate::gremlin::{GValue, Traversal};
use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures reported by a backend
///
/// These carry raw detail for server-side logs. The adapter reclassifies them
/// before anything reaches a caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Connection refused, reset, throttled or otherwise not reachable
    #[error("graph database unavailable: {0}")]
    Unavailable(String),

    /// The store or the transport gave up waiting
    #[error("graph query timed out: {0}")]
    Timeout(String),

    /// The store answered but refused the query
    #[error("graph database rejected query (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded
    #[error("malformed graph response: {0}")]
    Protocol(String),

    /// `close()` has already been called
    #[error("graph backend is closed")]
    Closed,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A graph store that can evaluate traversals
///
/// Implemented by:
/// - `GremlinHttpClient`: a Gremlin Server / Neptune HTTP endpoint
/// - `MemoryGraph`: an immutable in-process graph (local mode, tests)
///
/// Implementations must be safe for concurrent use; the adapter shares one
/// instance across all in-flight requests.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Evaluate a traversal and return its raw result list
    async fn submit(&self, traversal: &Traversal) -> BackendResult<Vec<GValue>>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Release the connection. Later submissions fail with `Closed`.
    async fn close(&self);
}
