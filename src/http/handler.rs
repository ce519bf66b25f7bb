//! HTTP handlers for the traversal API
//!
//! Path ids are validated by the `PathId` extractor and query parameters are
//! coerced before any adapter call. Nothing reaches the adapter unvalidated.

use super::error::ApiError;
use super::params::{self, Params, PathId};
use crate::adapter::QueryAdapter;
use crate::graph::{Edge, Page, Subgraph, Vertex};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<QueryAdapter>,
}

impl AppState {
    pub fn new(adapter: Arc<QueryAdapter>) -> Self {
        Self { adapter }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Liveness check; never touches the graph database
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "backend": state.adapter.backend_name(),
    }))
}

pub async fn vertex_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<Vertex> {
    Ok(Json(state.adapter.get_vertex(&id).await?))
}

pub async fn edges_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Vec<Edge>> {
    let direction = params::direction(&query)?;
    Ok(Json(state.adapter.get_edges(&id, direction).await?))
}

pub async fn neighbors_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Vec<Vertex>> {
    let direction = params::direction(&query)?;
    let label = params::optional_label(&query)?;
    Ok(Json(state.adapter.get_neighbors(&id, direction, label).await?))
}

pub async fn subgraph_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Subgraph> {
    let depth = params::depth(&query)?;
    let subgraph = state.adapter.get_subgraph(&id, depth).await?;
    debug!(
        root = %id,
        vertices = subgraph.vertices.len(),
        edges = subgraph.edges.len(),
        truncated = subgraph.truncated,
        "subgraph built"
    );
    Ok(Json(subgraph))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Params(query): Params,
) -> ApiResult<Page<Vertex>> {
    let label = params::required_label(&query)?;
    let page = params::pagination(&query)?;
    Ok(Json(state.adapter.search_by_label(label, page).await?))
}

pub async fn cast_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Page<Vertex>> {
    let page = params::pagination(&query)?;
    Ok(Json(state.adapter.get_cast(&id, page).await?))
}

pub async fn recommendations_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Vec<Vertex>> {
    let limit = params::limit(&query)?;
    Ok(Json(state.adapter.get_recommendations(&id, limit).await?))
}

pub async fn filmography_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    Params(query): Params,
) -> ApiResult<Page<Vertex>> {
    let page = params::pagination(&query)?;
    Ok(Json(state.adapter.get_filmography(&id, page).await?))
}

pub async fn not_found_handler() -> ApiError {
    ApiError::RouteNotFound
}
