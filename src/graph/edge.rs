//! Edge record returned by the traversal API

use super::property::PropertyMap;
use super::types::{EdgeLabel, VertexId};
use serde::{Deserialize, Serialize};

/// A directed edge between two vertices
///
/// Referential integrity of `from`/`to` is the store's concern; this layer
/// reports whatever endpoints the backend returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier assigned at load time (e.g. "e1024")
    pub id: String,

    /// Relationship type
    pub label: EdgeLabel,

    /// Source vertex (edge goes FROM this vertex)
    pub from: VertexId,

    /// Target vertex (edge goes TO this vertex)
    pub to: VertexId,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(id: impl Into<String>, label: EdgeLabel, from: VertexId, to: VertexId) -> Self {
        Edge {
            id: id.into(),
            label,
            from,
            to,
            properties: PropertyMap::new(),
        }
    }

    /// The endpoint opposite to `vertex`, if `vertex` is one of the endpoints
    pub fn other_end(&self, vertex: &VertexId) -> Option<&VertexId> {
        if &self.from == vertex {
            Some(&self.to)
        } else if &self.to == vertex {
            Some(&self.from)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(s: &str) -> VertexId {
        VertexId::parse(s).unwrap()
    }

    #[test]
    fn test_edge_json_omits_empty_properties() {
        let e = Edge::new("e1", EdgeLabel::AppearsIn, vid("nm1"), vid("tt1"));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "e1",
                "label": "appears_in",
                "from": "nm1",
                "to": "tt1"
            })
        );
    }

    #[test]
    fn test_other_end() {
        let e = Edge::new("e1", EdgeLabel::AppearsIn, vid("nm1"), vid("tt1"));
        assert_eq!(e.other_end(&vid("nm1")), Some(&vid("tt1")));
        assert_eq!(e.other_end(&vid("tt1")), Some(&vid("nm1")));
        assert_eq!(e.other_end(&vid("tt2")), None);
        let looped = Edge::new("e2", EdgeLabel::AppearsIn, vid("tt1"), vid("tt1"));
        assert_eq!(looped.other_end(&vid("tt1")), Some(&vid("tt1")));
    }
}
