//! Movie Graph API
//!
//! A read-only HTTP service for navigating a movie/person graph stored in a
//! Gremlin-compatible graph database (Amazon Neptune, TinkerPop Gremlin
//! Server), or in an in-memory graph loaded from a JSON fixture.
//!
//! # Architecture
//!
//! - `graph`: typed vertices, edges, pagination
//! - `gremlin`: traversal model, GraphSON decoding, HTTP transport, SigV4
//! - `backend`: the `GraphBackend` seam both stores implement
//! - `memory`: in-memory graph evaluating the same traversals
//! - `adapter`: typed traversal API with deadlines, retry and failure taxonomy
//! - `http`: axum router, parameter coercion, error bodies
//! - `config`: YAML + environment configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use moviegraph::adapter::{AdapterOptions, QueryAdapter};
//! use moviegraph::graph::{Direction, VertexId};
//! use moviegraph::memory::MemoryGraph;
//! use std::sync::Arc;
//!
//! let graph = MemoryGraph::from_json_str(r#"{
//!     "vertices": [
//!         {"id": "nm1", "label": "person", "properties": {"primaryName": "Alice"}},
//!         {"id": "tt1", "label": "movie", "properties": {"primaryTitle": "Heat"}}
//!     ],
//!     "edges": [{"id": "e1", "label": "appears_in", "from": "nm1", "to": "tt1"}]
//! }"#).unwrap();
//!
//! let adapter = QueryAdapter::new(Arc::new(graph), AdapterOptions::default());
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let cast = rt.block_on(async {
//!     adapter
//!         .get_neighbors(&VertexId::parse("tt1").unwrap(), Direction::In, None)
//!         .await
//! }).unwrap();
//! assert_eq!(cast.len(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod backend;
pub mod config;
pub mod graph;
pub mod gremlin;
pub mod http;
pub mod memory;

// Re-export main types for convenience
pub use adapter::{AdapterError, AdapterOptions, AdapterResult, QueryAdapter};
pub use backend::{BackendError, BackendResult, GraphBackend};
pub use config::{AppConfig, ConfigError};
pub use graph::{
    Depth, Direction, Edge, EdgeLabel, Page, Pagination, PropertyMap, PropertyValue, Subgraph,
    Vertex, VertexId, VertexLabel,
};
pub use gremlin::{GValue, GremlinHttpClient, Traversal};
pub use http::{build_router, ApiError, AppState, HttpServer};
pub use memory::MemoryGraph;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
