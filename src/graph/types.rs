//! Core type definitions for the movie graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest vertex id accepted from a caller
pub const MAX_ID_LEN: usize = 256;

/// Errors raised while parsing domain values from untrusted input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphModelError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("id exceeds {MAX_ID_LEN} bytes")]
    IdTooLong,

    #[error("id contains invalid character {0:?}")]
    InvalidIdChar(char),

    #[error("unknown vertex label '{0}' (expected movie or person)")]
    UnknownVertexLabel(String),

    #[error("unknown edge label '{0}' (expected appears_in)")]
    UnknownEdgeLabel(String),

    #[error("unknown direction '{0}' (expected in, out or both)")]
    UnknownDirection(String),

    #[error("limit must be between {min} and {max}, got {got}")]
    LimitOutOfRange { min: u32, max: u32, got: u64 },

    #[error("offset must be at most {max}, got {got}")]
    OffsetOutOfRange { max: u64, got: u64 },

    #[error("depth must be between {min} and {max}, got {got}")]
    DepthOutOfRange { min: u32, max: u32, got: u64 },
}

impl GraphModelError {
    /// Name of the request parameter the error is about
    pub fn parameter(&self) -> &'static str {
        match self {
            GraphModelError::EmptyId | GraphModelError::IdTooLong | GraphModelError::InvalidIdChar(_) => "id",
            GraphModelError::UnknownVertexLabel(_) | GraphModelError::UnknownEdgeLabel(_) => "label",
            GraphModelError::UnknownDirection(_) => "direction",
            GraphModelError::LimitOutOfRange { .. } => "limit",
            GraphModelError::OffsetOutOfRange { .. } => "offset",
            GraphModelError::DepthOutOfRange { .. } => "depth",
        }
    }
}

/// Identifier of a vertex, as assigned by the bulk loader
///
/// Ids are validated before they reach the backend so a malformed id never
/// costs a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    /// Validate and wrap a raw id
    pub fn parse(raw: &str) -> Result<Self, GraphModelError> {
        if raw.is_empty() {
            return Err(GraphModelError::EmptyId);
        }
        if raw.len() > MAX_ID_LEN {
            return Err(GraphModelError::IdTooLong);
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')))
        {
            return Err(GraphModelError::InvalidIdChar(bad));
        }
        Ok(VertexId(raw.to_string()))
    }

    /// Wrap an id reported by the backend without validation
    pub(crate) fn from_backend(raw: impl Into<String>) -> Self {
        VertexId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VertexId {
    type Err = GraphModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VertexId::parse(s)
    }
}

/// Vertex label. The label space is closed to the two domain kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum VertexLabel {
    Movie,
    Person,
}

impl VertexLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexLabel::Movie => "movie",
            VertexLabel::Person => "person",
        }
    }
}

impl fmt::Display for VertexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VertexLabel {
    type Err = GraphModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(VertexLabel::Movie),
            "person" => Ok(VertexLabel::Person),
            other => Err(GraphModelError::UnknownVertexLabel(other.to_string())),
        }
    }
}

/// Edge label (relationship type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLabel {
    AppearsIn,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::AppearsIn => "appears_in",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeLabel {
    type Err = GraphModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appears_in" => Ok(EdgeLabel::AppearsIn),
            other => Err(GraphModelError::UnknownEdgeLabel(other.to_string())),
        }
    }
}

/// Which edge orientation a traversal follows, relative to the start vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Incoming edges, reaching their source vertices
    In,
    /// Outgoing edges, reaching their target vertices
    Out,
    #[default]
    Both,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GraphModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "both" => Ok(Direction::Both),
            other => Err(GraphModelError::UnknownDirection(other.to_string())),
        }
    }
}
