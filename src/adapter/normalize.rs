//! Mapping from raw Gremlin results to `Vertex` and `Edge` records
//!
//! Accepts both `elementMap()` output (maps keyed by `T.id`, `T.label`,
//! `Direction.IN/OUT` and property names) and whole graph elements.

use crate::graph::{Edge, EdgeLabel, PropertyMap, PropertyValue, Vertex, VertexId, VertexLabel};
use crate::gremlin::{EdgeEnd, GValue, Token};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("expected {expected}, got {got}")]
    UnexpectedShape {
        expected: &'static str,
        got: &'static str,
    },

    #[error("{element} is missing {field}")]
    MissingField {
        element: &'static str,
        field: &'static str,
    },

    #[error("unexpected label '{0}'")]
    UnexpectedLabel(String),

    #[error("count is not a non-negative integer")]
    BadCount,
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;

pub fn vertex(value: &GValue) -> NormalizeResult<Vertex> {
    match value {
        GValue::Map(entries) => {
            let id = map_id(value, "vertex")?;
            let label = map_label(value, "vertex")?;
            let label: VertexLabel = label
                .parse()
                .map_err(|_| NormalizeError::UnexpectedLabel(label.to_string()))?;
            Ok(Vertex::with_properties(
                VertexId::from_backend(id),
                label,
                map_properties(entries),
            ))
        }
        GValue::Vertex(v) => {
            let label: VertexLabel = v
                .label
                .parse()
                .map_err(|_| NormalizeError::UnexpectedLabel(v.label.clone()))?;
            Ok(Vertex::with_properties(
                VertexId::from_backend(v.id.clone()),
                label,
                element_properties(&v.properties),
            ))
        }
        other => Err(NormalizeError::UnexpectedShape {
            expected: "vertex",
            got: other.type_name(),
        }),
    }
}

pub fn edge(value: &GValue) -> NormalizeResult<Edge> {
    match value {
        GValue::Map(entries) => {
            let id = map_id(value, "edge")?;
            let label = parse_edge_label(map_label(value, "edge")?)?;
            let from = endpoint_id(value, EdgeEnd::Out)?;
            let to = endpoint_id(value, EdgeEnd::In)?;
            let mut edge = Edge::new(id, label, VertexId::from_backend(from), VertexId::from_backend(to));
            edge.properties = map_properties(entries);
            Ok(edge)
        }
        GValue::Edge(e) => {
            let label = parse_edge_label(&e.label)?;
            let mut edge = Edge::new(
                e.id.clone(),
                label,
                VertexId::from_backend(e.out_v.clone()),
                VertexId::from_backend(e.in_v.clone()),
            );
            edge.properties = element_properties(&e.properties);
            Ok(edge)
        }
        other => Err(NormalizeError::UnexpectedShape {
            expected: "edge",
            got: other.type_name(),
        }),
    }
}

/// Read the single result of a `count()` traversal. No result counts as zero.
pub fn count(values: &[GValue]) -> NormalizeResult<u64> {
    match values.first() {
        None => Ok(0),
        Some(v) => v
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or(NormalizeError::BadCount),
    }
}

pub fn vertices(values: &[GValue]) -> NormalizeResult<Vec<Vertex>> {
    values.iter().map(vertex).collect()
}

pub fn edges(values: &[GValue]) -> NormalizeResult<Vec<Edge>> {
    values.iter().map(edge).collect()
}

fn map_id(map: &GValue, element: &'static str) -> NormalizeResult<String> {
    map.get(&GValue::Token(Token::Id))
        .and_then(GValue::id_string)
        .ok_or(NormalizeError::MissingField { element, field: "id" })
}

fn map_label<'a>(map: &'a GValue, element: &'static str) -> NormalizeResult<&'a str> {
    map.get(&GValue::Token(Token::Label))
        .and_then(GValue::as_str)
        .ok_or(NormalizeError::MissingField {
            element,
            field: "label",
        })
}

fn endpoint_id(map: &GValue, end: EdgeEnd) -> NormalizeResult<String> {
    let field = match end {
        EdgeEnd::In => "inV",
        EdgeEnd::Out => "outV",
    };
    map.get(&GValue::EdgeEnd(end))
        .and_then(|endpoint| match endpoint {
            GValue::Map(_) => endpoint.get(&GValue::Token(Token::Id)),
            // Some servers inline the bare id
            other => Some(other),
        })
        .and_then(GValue::id_string)
        .ok_or(NormalizeError::MissingField {
            element: "edge",
            field,
        })
}

fn parse_edge_label(raw: &str) -> NormalizeResult<EdgeLabel> {
    raw.parse()
        .map_err(|_| NormalizeError::UnexpectedLabel(raw.to_string()))
}

/// String-keyed entries of an element map are properties
fn map_properties(entries: &[(GValue, GValue)]) -> PropertyMap {
    entries
        .iter()
        .filter_map(|(k, v)| match k {
            GValue::String(key) => property_value(v).map(|p| (key.clone(), p)),
            _ => None,
        })
        .collect()
}

/// Multi-valued element properties collapse into an array
fn element_properties(props: &[(String, GValue)]) -> PropertyMap {
    let mut out = PropertyMap::new();
    for (key, value) in props {
        let Some(value) = property_value(value) else {
            continue;
        };
        match out.remove(key) {
            None => {
                out.insert(key.clone(), value);
            }
            Some(PropertyValue::Array(mut items)) => {
                items.push(value);
                out.insert(key.clone(), PropertyValue::Array(items));
            }
            Some(existing) => {
                out.insert(key.clone(), PropertyValue::Array(vec![existing, value]));
            }
        }
    }
    out
}

fn property_value(value: &GValue) -> Option<PropertyValue> {
    match value {
        GValue::Bool(b) => Some(PropertyValue::Boolean(*b)),
        GValue::Int(i) => Some(PropertyValue::Integer(*i)),
        GValue::Double(f) => Some(PropertyValue::Float(*f)),
        GValue::String(s) => Some(PropertyValue::String(s.clone())),
        GValue::List(items) => Some(PropertyValue::Array(
            items.iter().filter_map(property_value).collect(),
        )),
        _ => None,
    }
}
