//! The search-engine client interface.
//!
//! The network layer is an external collaborator; the compiler only needs
//! something that takes a request JSON and returns the engine's response
//! JSON. One user query may need several independent backend requests
//! (the main query plus a predicate aggregation in object search); they
//! are handed over as one batch so an implementation can issue them
//! concurrently under its own deadline. No retries happen here — retry
//! policy belongs to the client implementation.

use serde_json::Value;
use thiserror::Error;

/// A failure reported by the client: timeout, connection refused, or an
/// engine-level error response.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClientError(pub String);

/// A search-engine client.
pub trait SearchClient {
    /// Executes a single request.
    fn search(&self, request: &Value) -> Result<Value, ClientError>;

    /// Executes independent requests, returning one response per request
    /// in order. The default issues them sequentially; implementations
    /// are free to run them concurrently.
    fn multi_search(&self, requests: &[Value]) -> Result<Vec<Value>, ClientError> {
        requests.iter().map(|r| self.search(r)).collect()
    }
}
