//! In-memory graph backend
//!
//! An immutable graph loaded once (from a JSON fixture or built in code) that
//! evaluates the same `Traversal` model the Gremlin client renders. Used for
//! local development without a graph database, and by the test suites.

mod eval;

use crate::graph::{Edge, Vertex, VertexId, VertexLabel};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use thiserror::Error;

/// Errors raised while building a memory graph
#[derive(Error, Debug)]
pub enum MemoryGraphError {
    #[error("Vertex {0} already exists")]
    VertexAlreadyExists(VertexId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(String),

    #[error("Invalid edge {edge}: source vertex {vertex} does not exist")]
    InvalidEdgeSource { edge: String, vertex: VertexId },

    #[error("Invalid edge {edge}: target vertex {vertex} does not exist")]
    InvalidEdgeTarget { edge: String, vertex: VertexId },

    #[error("I/O error reading fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MemoryGraphResult<T> = Result<T, MemoryGraphError>;

/// Fixture file layout
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    vertices: Vec<Vertex>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// Read-only in-memory graph
///
/// - vertices: VertexId -> Vertex (insertion ordered, so scans are stable)
/// - edges: edge id -> Edge
/// - outgoing / incoming: VertexId -> edge ids (adjacency lists)
/// - label_index: VertexLabel -> VertexIds
#[derive(Debug, Default)]
pub struct MemoryGraph {
    vertices: IndexMap<VertexId, Vertex>,
    edges: IndexMap<String, Edge>,
    outgoing: HashMap<VertexId, Vec<String>>,
    incoming: HashMap<VertexId, Vec<String>>,
    label_index: HashMap<VertexLabel, Vec<VertexId>>,
    closed: AtomicBool,
}

impl MemoryGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph from a JSON fixture: `{"vertices": [...], "edges": [...]}`
    pub fn from_fixture(path: impl AsRef<Path>) -> MemoryGraphResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> MemoryGraphResult<Self> {
        let fixture: Fixture = serde_json::from_str(text)?;
        let mut graph = Self::new();
        for vertex in fixture.vertices {
            graph.add_vertex(vertex)?;
        }
        for edge in fixture.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Insert a vertex. Ids are unique.
    pub fn add_vertex(&mut self, vertex: Vertex) -> MemoryGraphResult<()> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(MemoryGraphError::VertexAlreadyExists(vertex.id));
        }
        self.label_index
            .entry(vertex.label)
            .or_default()
            .push(vertex.id.clone());
        self.vertices.insert(vertex.id.clone(), vertex);
        Ok(())
    }

    /// Insert an edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: Edge) -> MemoryGraphResult<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(MemoryGraphError::EdgeAlreadyExists(edge.id));
        }
        if !self.vertices.contains_key(&edge.from) {
            return Err(MemoryGraphError::InvalidEdgeSource {
                edge: edge.id,
                vertex: edge.from,
            });
        }
        if !self.vertices.contains_key(&edge.to) {
            return Err(MemoryGraphError::InvalidEdgeTarget {
                edge: edge.id,
                vertex: edge.to,
            });
        }

        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(edge.id.clone());
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    pub fn get_vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Get all outgoing edges from a vertex
    pub fn outgoing_edges(&self, id: &VertexId) -> Vec<&Edge> {
        self.outgoing
            .get(id)
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e)).collect())
            .unwrap_or_default()
    }

    /// Get all incoming edges to a vertex
    pub fn incoming_edges(&self, id: &VertexId) -> Vec<&Edge> {
        self.incoming
            .get(id)
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e)).collect())
            .unwrap_or_default()
    }

    /// Get all vertices with a label, in insertion order
    pub fn vertices_by_label(&self, label: VertexLabel) -> Vec<&Vertex> {
        self.label_index
            .get(&label)
            .map(|ids| ids.iter().filter_map(|id| self.vertices.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
