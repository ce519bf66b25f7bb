//! Path and query-string coercion
//!
//! Raw strings in, typed values out. Absent or empty values take the
//! documented default; anything else must parse and be in range.
//! The extractors here reject with `ApiError`, so malformed URLs get the
//! same JSON body as any other validation failure.

use super::error::ApiError;
use crate::graph::{Depth, Direction, GraphModelError, Pagination, VertexId, VertexLabel};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use std::collections::HashMap;
use std::num::IntErrorKind;

pub type QueryParams = HashMap<String, String>;

/// Validated vertex id from the `:id` path segment
#[derive(Debug)]
pub struct PathId(pub VertexId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation("id", rejection.body_text()))?;
        vertex_id(&raw_id).map(PathId)
    }
}

/// Query string as raw key/value pairs
#[derive(Debug)]
pub struct Params(pub QueryParams);

#[async_trait]
impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<QueryParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation("query", rejection.body_text()))?;
        Ok(Params(query))
    }
}

fn raw<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

pub fn vertex_id(raw_id: &str) -> Result<VertexId, ApiError> {
    VertexId::parse(raw_id).map_err(|e| ApiError::validation("id", e.to_string()))
}

pub fn direction(params: &QueryParams) -> Result<Direction, ApiError> {
    match raw(params, "direction") {
        None => Ok(Direction::default()),
        Some(v) => v
            .parse()
            .map_err(|e: GraphModelError| ApiError::validation("direction", e.to_string())),
    }
}

pub fn optional_label(params: &QueryParams) -> Result<Option<VertexLabel>, ApiError> {
    raw(params, "label")
        .map(|v| {
            v.parse()
                .map_err(|e: GraphModelError| ApiError::validation("label", e.to_string()))
        })
        .transpose()
}

pub fn required_label(params: &QueryParams) -> Result<VertexLabel, ApiError> {
    optional_label(params)?.ok_or(ApiError::MissingParameter("label"))
}

fn integer(params: &QueryParams, name: &'static str) -> Result<Option<u64>, ApiError> {
    let Some(v) = raw(params, name) else {
        return Ok(None);
    };
    v.parse::<u64>().map(Some).map_err(|e| {
        let message = match e.kind() {
            IntErrorKind::PosOverflow => format!("{} is out of range", name),
            _ => format!("{} must be a non-negative integer", name),
        };
        ApiError::validation(name, message)
    })
}

pub fn pagination(params: &QueryParams) -> Result<Pagination, ApiError> {
    let limit = integer(params, "limit")?.unwrap_or(Pagination::DEFAULT_LIMIT as u64);
    let offset = integer(params, "offset")?.unwrap_or(0);
    Pagination::new(limit, offset).map_err(|e| ApiError::validation(e.parameter(), e.to_string()))
}

/// `limit` alone, with the same bounds as pagination
pub fn limit(params: &QueryParams) -> Result<u32, ApiError> {
    let limit = integer(params, "limit")?.unwrap_or(Pagination::DEFAULT_LIMIT as u64);
    Pagination::new(limit, 0)
        .map(|p| p.limit())
        .map_err(|e| ApiError::validation("limit", e.to_string()))
}

pub fn depth(params: &QueryParams) -> Result<Depth, ApiError> {
    match integer(params, "depth")? {
        None => Ok(Depth::default()),
        Some(d) => Depth::new(d).map_err(|e| ApiError::validation("depth", e.to_string())),
    }
}
