//! Traversal evaluation over the in-memory graph

use super::MemoryGraph;
use crate::backend::{BackendError, BackendResult, GraphBackend};
use crate::graph::{Direction, Edge, EdgeLabel, PropertyMap, PropertyValue, Vertex};
use crate::gremlin::{EdgeEnd, GEdge, GValue, GVertex, Source, Step, Token, Traversal};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use tracing::debug;

/// A traverser's current position
#[derive(Debug, Clone)]
enum Traverser<'g> {
    Vertex(&'g Vertex),
    Edge(&'g Edge),
    Value(GValue),
}

impl MemoryGraph {
    /// Evaluate a traversal synchronously
    pub fn evaluate(&self, traversal: &Traversal) -> BackendResult<Vec<GValue>> {
        let mut steps = traversal.steps();
        let mut current: Vec<Traverser<'_>> = match (traversal.source(), steps.first()) {
            // g.V().hasLabel(l) is answered from the label index
            (Source::AllVertices, Some(Step::HasLabel(label))) => {
                steps = &traversal.steps()[1..];
                self.vertices_by_label(*label)
                    .into_iter()
                    .map(Traverser::Vertex)
                    .collect()
            }
            (Source::AllVertices, _) => self.vertices.values().map(Traverser::Vertex).collect(),
            (Source::Vertices(ids), _) => ids
                .iter()
                .filter_map(|id| self.vertices.get(id))
                .map(Traverser::Vertex)
                .collect(),
        };

        for step in steps {
            current = self.apply(step, current)?;
        }

        Ok(current.into_iter().map(|t| self.into_value(t)).collect())
    }

    fn apply<'g>(&'g self, step: &Step, input: Vec<Traverser<'g>>) -> BackendResult<Vec<Traverser<'g>>> {
        let out = match step {
            Step::Adjacent(direction, label) => {
                let mut out = Vec::new();
                for t in input {
                    let v = expect_vertex(&t, "adjacent")?;
                    out.extend(self.adjacent(v, *direction, *label).map(Traverser::Vertex));
                }
                out
            }
            Step::Incident(direction, label) => {
                let mut out = Vec::new();
                for t in input {
                    let v = expect_vertex(&t, "incident")?;
                    out.extend(self.incident(v, *direction, *label).map(Traverser::Edge));
                }
                out
            }
            Step::HasLabel(label) => input
                .into_iter()
                .filter(|t| matches!(t, Traverser::Vertex(v) if v.has_label(*label)))
                .collect(),
            Step::ExcludeId(id) => input
                .into_iter()
                .filter(|t| match t {
                    Traverser::Vertex(v) => &v.id != id,
                    Traverser::Edge(e) => e.id != id.as_str(),
                    Traverser::Value(_) => true,
                })
                .collect(),
            Step::Dedup => {
                let mut seen = HashSet::new();
                input
                    .into_iter()
                    .filter(|t| seen.insert(dedup_key(t)))
                    .collect()
            }
            Step::Range(low, high) => {
                let take = high.saturating_sub(*low);
                input
                    .into_iter()
                    .skip(usize::try_from(*low).unwrap_or(usize::MAX))
                    .take(usize::try_from(take).unwrap_or(usize::MAX))
                    .collect()
            }
            Step::Limit(n) => input
                .into_iter()
                .take(usize::try_from(*n).unwrap_or(usize::MAX))
                .collect(),
            Step::Count => vec![Traverser::Value(GValue::Int(input.len() as i64))],
            Step::ElementMap => input
                .into_iter()
                .map(|t| match t {
                    Traverser::Vertex(v) => Ok(Traverser::Value(self.vertex_element_map(v))),
                    Traverser::Edge(e) => Ok(Traverser::Value(self.edge_element_map(e))),
                    Traverser::Value(v) => Err(BackendError::Rejected {
                        status: 500,
                        message: format!("elementMap() applied to a {}", v.type_name()),
                    }),
                })
                .collect::<BackendResult<_>>()?,
        };
        Ok(out)
    }

    fn adjacent<'g>(
        &'g self,
        v: &'g Vertex,
        direction: Direction,
        label: EdgeLabel,
    ) -> impl Iterator<Item = &'g Vertex> + 'g {
        // For self loops both ends are `v`.
        self.incident(v, direction, label)
            .filter_map(move |e| e.other_end(&v.id).and_then(|other| self.vertices.get(other)))
    }

    fn incident<'g>(
        &'g self,
        v: &'g Vertex,
        direction: Direction,
        label: EdgeLabel,
    ) -> impl Iterator<Item = &'g Edge> + 'g {
        let out = match direction {
            Direction::Out | Direction::Both => self.outgoing_edges(&v.id),
            Direction::In => Vec::new(),
        };
        let inc = match direction {
            Direction::In | Direction::Both => self.incoming_edges(&v.id),
            Direction::Out => Vec::new(),
        };
        out.into_iter()
            .chain(inc)
            .filter(move |e| e.label == label)
    }

    fn vertex_element_map(&self, v: &Vertex) -> GValue {
        let mut entries = vec![
            (GValue::Token(Token::Id), GValue::String(v.id.to_string())),
            (GValue::Token(Token::Label), GValue::String(v.label.to_string())),
        ];
        entries.extend(property_entries(&v.properties));
        GValue::Map(entries)
    }

    fn edge_element_map(&self, e: &Edge) -> GValue {
        let endpoint = |id: &crate::graph::VertexId| {
            let mut entries = vec![(GValue::Token(Token::Id), GValue::String(id.to_string()))];
            if let Some(v) = self.vertices.get(id) {
                entries.push((GValue::Token(Token::Label), GValue::String(v.label.to_string())));
            }
            GValue::Map(entries)
        };
        let mut entries = vec![
            (GValue::Token(Token::Id), GValue::String(e.id.clone())),
            (GValue::Token(Token::Label), GValue::String(e.label.to_string())),
            (GValue::EdgeEnd(EdgeEnd::In), endpoint(&e.to)),
            (GValue::EdgeEnd(EdgeEnd::Out), endpoint(&e.from)),
        ];
        entries.extend(property_entries(&e.properties));
        GValue::Map(entries)
    }

    fn into_value(&self, t: Traverser<'_>) -> GValue {
        match t {
            Traverser::Vertex(v) => GValue::Vertex(GVertex {
                id: v.id.to_string(),
                label: v.label.to_string(),
                properties: v
                    .properties
                    .iter()
                    .map(|(k, p)| (k.clone(), property_to_gvalue(p)))
                    .collect(),
            }),
            Traverser::Edge(e) => GValue::Edge(GEdge {
                id: e.id.clone(),
                label: e.label.to_string(),
                out_v: e.from.to_string(),
                in_v: e.to.to_string(),
                properties: e
                    .properties
                    .iter()
                    .map(|(k, p)| (k.clone(), property_to_gvalue(p)))
                    .collect(),
            }),
            Traverser::Value(v) => v,
        }
    }
}

fn expect_vertex<'g>(t: &Traverser<'g>, step: &str) -> BackendResult<&'g Vertex> {
    match t {
        Traverser::Vertex(v) => Ok(v),
        _ => Err(BackendError::Rejected {
            status: 500,
            message: format!("{} step requires vertex traversers", step),
        }),
    }
}

fn dedup_key(t: &Traverser<'_>) -> String {
    match t {
        Traverser::Vertex(v) => format!("v:{}", v.id),
        Traverser::Edge(e) => format!("e:{}", e.id),
        Traverser::Value(v) => format!("x:{:?}", v),
    }
}

fn property_entries(props: &PropertyMap) -> impl Iterator<Item = (GValue, GValue)> + '_ {
    props
        .iter()
        .map(|(k, v)| (GValue::String(k.clone()), property_to_gvalue(v)))
}

fn property_to_gvalue(p: &PropertyValue) -> GValue {
    match p {
        PropertyValue::Boolean(b) => GValue::Bool(*b),
        PropertyValue::Integer(i) => GValue::Int(*i),
        PropertyValue::Float(f) => GValue::Double(*f),
        PropertyValue::String(s) => GValue::String(s.clone()),
        PropertyValue::Array(items) => GValue::List(items.iter().map(property_to_gvalue).collect()),
    }
}

#[async_trait]
impl GraphBackend for MemoryGraph {
    async fn submit(&self, traversal: &Traversal) -> BackendResult<Vec<GValue>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed);
        }
        debug!(script = %traversal, "evaluating traversal in memory");
        self.evaluate(traversal)
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
