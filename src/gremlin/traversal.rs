//! Typed traversal steps and their Gremlin script rendering
//!
//! Only the handful of steps the adapter needs are modelled. Keeping the
//! traversal as data (instead of formatting strings at each call site) lets
//! the HTTP client render it and the in-memory graph evaluate it directly.

use crate::graph::{Direction, EdgeLabel, VertexId, VertexLabel};
use std::fmt;

/// Where a traversal starts
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// `g.V(id, ...)`
    Vertices(Vec<VertexId>),
    /// `g.V()`
    AllVertices,
}

/// A single traversal step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Adjacent vertices: `in(l)`, `out(l)`, `both(l)`
    Adjacent(Direction, EdgeLabel),
    /// Incident edges: `inE(l)`, `outE(l)`, `bothE(l)`
    Incident(Direction, EdgeLabel),
    HasLabel(VertexLabel),
    /// `not(__.hasId(id))`
    ExcludeId(VertexId),
    Dedup,
    /// `range(lo, hi)`, `hi` exclusive
    Range(u64, u64),
    Limit(u64),
    Count,
    /// `elementMap()`: id, label, properties and (for edges) both endpoints
    ElementMap,
}

/// A traversal over the graph: a source followed by steps
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    source: Source,
    steps: Vec<Step>,
}

impl Traversal {
    /// Start at one vertex
    pub fn v(id: &VertexId) -> Self {
        Traversal {
            source: Source::Vertices(vec![id.clone()]),
            steps: Vec::new(),
        }
    }

    /// Start at several vertices
    pub fn v_many(ids: impl IntoIterator<Item = VertexId>) -> Self {
        Traversal {
            source: Source::Vertices(ids.into_iter().collect()),
            steps: Vec::new(),
        }
    }

    /// Start at every vertex
    pub fn all_vertices() -> Self {
        Traversal {
            source: Source::AllVertices,
            steps: Vec::new(),
        }
    }

    pub fn adjacent(mut self, direction: Direction, label: EdgeLabel) -> Self {
        self.steps.push(Step::Adjacent(direction, label));
        self
    }

    pub fn incident(mut self, direction: Direction, label: EdgeLabel) -> Self {
        self.steps.push(Step::Incident(direction, label));
        self
    }

    pub fn has_label(mut self, label: VertexLabel) -> Self {
        self.steps.push(Step::HasLabel(label));
        self
    }

    /// Apply `has_label` only when a label is given
    pub fn maybe_has_label(self, label: Option<VertexLabel>) -> Self {
        match label {
            Some(l) => self.has_label(l),
            None => self,
        }
    }

    pub fn exclude_id(mut self, id: &VertexId) -> Self {
        self.steps.push(Step::ExcludeId(id.clone()));
        self
    }

    pub fn dedup(mut self) -> Self {
        self.steps.push(Step::Dedup);
        self
    }

    pub fn range(mut self, low: u64, high: u64) -> Self {
        self.steps.push(Step::Range(low, high));
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.steps.push(Step::Limit(n));
        self
    }

    pub fn count(mut self) -> Self {
        self.steps.push(Step::Count);
        self
    }

    pub fn element_map(mut self) -> Self {
        self.steps.push(Step::ElementMap);
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Render as a Gremlin-Groovy script
    pub fn to_script(&self) -> String {
        self.to_string()
    }
}

/// Quote a string literal for a Gremlin script
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn direction_step(direction: Direction, edges: bool) -> &'static str {
    match (direction, edges) {
        (Direction::In, false) => "in",
        (Direction::Out, false) => "out",
        (Direction::Both, false) => "both",
        (Direction::In, true) => "inE",
        (Direction::Out, true) => "outE",
        (Direction::Both, true) => "bothE",
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::AllVertices => write!(f, "g.V()")?,
            Source::Vertices(ids) => {
                write!(f, "g.V(")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", quote(id.as_str()))?;
                }
                write!(f, ")")?;
            }
        }
        for step in &self.steps {
            match step {
                Step::Adjacent(dir, label) => {
                    write!(f, ".{}({})", direction_step(*dir, false), quote(label.as_str()))?
                }
                Step::Incident(dir, label) => {
                    write!(f, ".{}({})", direction_step(*dir, true), quote(label.as_str()))?
                }
                Step::HasLabel(label) => write!(f, ".hasLabel({})", quote(label.as_str()))?,
                Step::ExcludeId(id) => write!(f, ".not(__.hasId({}))", quote(id.as_str()))?,
                Step::Dedup => write!(f, ".dedup()")?,
                Step::Range(lo, hi) => write!(f, ".range({}, {})", lo, hi)?,
                Step::Limit(n) => write!(f, ".limit({})", n)?,
                Step::Count => write!(f, ".count()")?,
                Step::ElementMap => write!(f, ".elementMap()")?,
            }
        }
        Ok(())
    }
}
