//! Query adapter
//!
//! The only component that talks to the graph database. It owns the backend,
//! turns typed navigation requests into traversals, bounds every query with a
//! deadline, normalizes results into `Vertex`/`Edge` records and classifies
//! failures into `AdapterError`.

mod error;
pub mod normalize;

pub use error::{AdapterError, AdapterResult};

use crate::backend::{BackendError, GraphBackend};
use crate::config::AdapterConfig;
use crate::graph::{
    Depth, Direction, Edge, EdgeLabel, Page, Pagination, Subgraph, Vertex, VertexId, VertexLabel,
};
use crate::gremlin::{GValue, Traversal};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const APPEARS_IN: EdgeLabel = EdgeLabel::AppearsIn;

/// Adapter tuning
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOptions {
    /// Deadline for each backend round trip
    pub query_timeout: Duration,
    /// Extra attempts after an `UpstreamUnavailable` failure (0 or 1)
    pub unavailable_retries: u32,
    pub retry_backoff: Duration,
    /// Vertex cap for `get_subgraph`
    pub max_subgraph_vertices: usize,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self::from(&AdapterConfig::default())
    }
}

impl From<&AdapterConfig> for AdapterOptions {
    fn from(config: &AdapterConfig) -> Self {
        AdapterOptions {
            query_timeout: config.query_timeout(),
            unavailable_retries: config.unavailable_retries.min(1),
            retry_backoff: config.retry_backoff(),
            max_subgraph_vertices: config.max_subgraph_vertices,
        }
    }
}

/// Typed, read-only traversal API over a graph backend
pub struct QueryAdapter {
    backend: Arc<dyn GraphBackend>,
    options: AdapterOptions,
}

impl QueryAdapter {
    pub fn new(backend: Arc<dyn GraphBackend>, options: AdapterOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// Release the backend connection
    pub async fn close(&self) {
        debug!(backend = self.backend.name(), "closing graph backend");
        self.backend.close().await;
    }

    /// Look up exactly one vertex
    pub async fn get_vertex(&self, id: &VertexId) -> AdapterResult<Vertex> {
        let values = self.run("get_vertex", Traversal::v(id).element_map()).await?;
        let first = values
            .first()
            .ok_or_else(|| AdapterError::NotFound(id.clone()))?;
        let vertex = normalize::vertex(first).map_err(|e| AdapterError::unknown(e.to_string()))?;
        if &vertex.id != id {
            return Err(AdapterError::unknown(format!(
                "asked for vertex {} but the store returned {}",
                id, vertex.id
            )));
        }
        Ok(vertex)
    }

    /// Adjacent vertices over `appears_in`, de-duplicated by id
    pub async fn get_neighbors(
        &self,
        id: &VertexId,
        direction: Direction,
        label: Option<VertexLabel>,
    ) -> AdapterResult<Vec<Vertex>> {
        self.get_vertex(id).await?;
        let traversal = Traversal::v(id)
            .adjacent(direction, APPEARS_IN)
            .maybe_has_label(label)
            .dedup()
            .element_map();
        let values = self.run("get_neighbors", traversal).await?;
        let vertices = to_vertices(&values)?;
        Ok(dedup_by(vertices, |v| v.id.as_str().to_string()))
    }

    /// Incident `appears_in` edges, de-duplicated by edge id
    pub async fn get_edges(&self, id: &VertexId, direction: Direction) -> AdapterResult<Vec<Edge>> {
        self.get_vertex(id).await?;
        let traversal = Traversal::v(id).incident(direction, APPEARS_IN).element_map();
        let values = self.run("get_edges", traversal).await?;
        let edges = normalize::edges(&values).map_err(|e| AdapterError::unknown(e.to_string()))?;
        Ok(dedup_by(edges, |e| e.id.clone()))
    }

    /// One page of vertices with a label, plus the label's total count
    pub async fn search_by_label(&self, label: VertexLabel, page: Pagination) -> AdapterResult<Page<Vertex>> {
        let base = Traversal::all_vertices().has_label(label);
        self.paged("search_by_label", base, page).await
    }

    /// People connected to a movie
    pub async fn get_cast(&self, movie_id: &VertexId, page: Pagination) -> AdapterResult<Page<Vertex>> {
        self.expect_label(movie_id, VertexLabel::Movie).await?;
        let base = Traversal::v(movie_id)
            .adjacent(Direction::Both, APPEARS_IN)
            .has_label(VertexLabel::Person)
            .dedup();
        self.paged("get_cast", base, page).await
    }

    /// Movies connected to a person
    pub async fn get_filmography(&self, person_id: &VertexId, page: Pagination) -> AdapterResult<Page<Vertex>> {
        self.expect_label(person_id, VertexLabel::Person).await?;
        let base = Traversal::v(person_id)
            .adjacent(Direction::Both, APPEARS_IN)
            .has_label(VertexLabel::Movie)
            .dedup();
        self.paged("get_filmography", base, page).await
    }

    /// Other movies sharing at least one cast member with `movie_id`
    pub async fn get_recommendations(&self, movie_id: &VertexId, limit: u32) -> AdapterResult<Vec<Vertex>> {
        if limit == 0 {
            return Err(AdapterError::invalid("limit", "limit must be positive"));
        }
        self.expect_label(movie_id, VertexLabel::Movie).await?;
        let traversal = Traversal::v(movie_id)
            .adjacent(Direction::Both, APPEARS_IN)
            .has_label(VertexLabel::Person)
            .adjacent(Direction::Both, APPEARS_IN)
            .has_label(VertexLabel::Movie)
            .exclude_id(movie_id)
            .dedup()
            .limit(limit as u64)
            .element_map();
        let values = self.run("get_recommendations", traversal).await?;
        let mut movies = dedup_by(to_vertices(&values)?, |v| v.id.as_str().to_string());
        movies.retain(|v| &v.id != movie_id);
        movies.truncate(limit as usize);
        Ok(movies)
    }

    /// Breadth-first neighbourhood of `id`, one edge query per level
    pub async fn get_subgraph(&self, id: &VertexId, depth: Depth) -> AdapterResult<Subgraph> {
        let root = self.get_vertex(id).await?;
        let cap = self.options.max_subgraph_vertices.max(1);

        let mut vertices: IndexMap<VertexId, Vertex> = IndexMap::new();
        vertices.insert(root.id.clone(), root);
        let mut edges: IndexMap<String, Edge> = IndexMap::new();
        let mut frontier = vec![id.clone()];
        let mut truncated = false;

        for _ in 0..depth.get() {
            if frontier.is_empty() || truncated {
                break;
            }
            let traversal = Traversal::v_many(frontier.clone())
                .incident(Direction::Both, APPEARS_IN)
                .element_map();
            let values = self.run("get_subgraph", traversal).await?;
            let level = normalize::edges(&values).map_err(|e| AdapterError::unknown(e.to_string()))?;

            let mut discovered: IndexSet<VertexId> = IndexSet::new();
            for edge in &level {
                for end in [&edge.from, &edge.to] {
                    if !vertices.contains_key(end) {
                        discovered.insert(end.clone());
                    }
                }
            }
            for edge in level {
                edges.entry(edge.id.clone()).or_insert(edge);
            }

            let room = cap.saturating_sub(vertices.len());
            if discovered.len() > room {
                truncated = true;
                discovered.truncate(room);
            }
            if discovered.is_empty() {
                break;
            }

            let fetch = Traversal::v_many(discovered.iter().cloned()).element_map();
            let values = self.run("get_subgraph", fetch).await?;
            frontier.clear();
            for vertex in to_vertices(&values)? {
                if vertices.len() >= cap {
                    truncated = true;
                    break;
                }
                frontier.push(vertex.id.clone());
                vertices.entry(vertex.id.clone()).or_insert(vertex);
            }
        }

        // Keep only edges whose endpoints both made it in
        let edges: Vec<Edge> = edges
            .into_values()
            .filter(|e| vertices.contains_key(&e.from) && vertices.contains_key(&e.to))
            .collect();

        Ok(Subgraph {
            root: id.clone(),
            depth,
            vertices: vertices.into_values().collect(),
            edges,
            truncated,
        })
    }

    async fn expect_label(&self, id: &VertexId, expected: VertexLabel) -> AdapterResult<Vertex> {
        let vertex = self.get_vertex(id).await?;
        if vertex.label != expected {
            return Err(AdapterError::invalid(
                "id",
                format!("vertex {} is a {}, not a {}", id, vertex.label, expected),
            ));
        }
        Ok(vertex)
    }

    /// Count and range queries over the same base traversal, issued concurrently
    async fn paged(&self, op: &'static str, base: Traversal, page: Pagination) -> AdapterResult<Page<Vertex>> {
        let count = base.clone().count();
        let range = base.range(page.offset(), page.end()).element_map();
        let (count_values, range_values) = futures::try_join!(self.run(op, count), self.run(op, range))?;

        let total = normalize::count(&count_values).map_err(|e| AdapterError::unknown(e.to_string()))?;
        let mut results = to_vertices(&range_values)?;
        results.truncate(page.limit() as usize);
        Ok(Page::new(total, results))
    }

    /// Submit with a deadline; retry once on `Unavailable` if configured
    async fn run(&self, op: &'static str, traversal: Traversal) -> AdapterResult<Vec<GValue>> {
        let mut attempt = 0;
        loop {
            match self.submit_once(&traversal).await {
                Ok(values) => {
                    debug!(op, results = values.len(), "graph query ok");
                    return Ok(values);
                }
                Err(BackendError::Unavailable(detail)) if attempt < self.options.unavailable_retries => {
                    attempt += 1;
                    warn!(
                        op,
                        backend = self.backend.name(),
                        attempt,
                        error = %detail,
                        "graph database unavailable, retrying"
                    );
                    tokio::time::sleep(self.options.retry_backoff).await;
                }
                Err(err) => {
                    debug!(op, error = %err, "graph query failed");
                    return Err(AdapterError::from(err));
                }
            }
        }
    }

    async fn submit_once(&self, traversal: &Traversal) -> Result<Vec<GValue>, BackendError> {
        match tokio::time::timeout(self.options.query_timeout, self.backend.submit(traversal)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(format!(
                "no response within {} ms",
                self.options.query_timeout.as_millis()
            ))),
        }
    }
}

fn to_vertices(values: &[GValue]) -> AdapterResult<Vec<Vertex>> {
    normalize::vertices(values).map_err(|e| AdapterError::unknown(e.to_string()))
}

/// Drop repeats, keeping first-seen order
fn dedup_by<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
