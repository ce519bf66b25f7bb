//! Vertex record returned by the traversal API

use super::property::{PropertyMap, PropertyValue};
use super::types::{VertexId, VertexLabel};
use serde::{Deserialize, Serialize};

/// A vertex in the movie graph
///
/// Vertices are created by the bulk loader and never mutated here, so the
/// record is a plain value: id, immutable label and the open property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Identifier assigned at load time
    pub id: VertexId,

    /// Movie or person
    pub label: VertexLabel,

    /// Attribute bag, passed through as stored
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: VertexId, label: VertexLabel) -> Self {
        Vertex {
            id,
            label,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_properties(id: VertexId, label: VertexLabel, properties: PropertyMap) -> Self {
        Vertex { id, label, properties }
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn has_label(&self, label: VertexLabel) -> bool {
        self.label == label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_json_shape() {
        let mut props = PropertyMap::new();
        props.insert("primaryName".to_string(), "Kevin Bacon".into());
        let v = Vertex::with_properties(
            VertexId::parse("nm0000102").unwrap(),
            VertexLabel::Person,
            props,
        );

        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "nm0000102",
                "label": "person",
                "properties": { "primaryName": "Kevin Bacon" }
            })
        );
        assert!(v.has_label(VertexLabel::Person));
        assert_eq!(
            v.get_property("primaryName"),
            Some(&PropertyValue::from("Kevin Bacon"))
        );
    }

    #[test]
    fn test_vertex_missing_properties_defaults_empty() {
        let v: Vertex =
            serde_json::from_str(r#"{"id":"tt1","label":"movie"}"#).unwrap();
        assert!(v.properties.is_empty());
        assert_eq!(v, Vertex::new(VertexId::parse("tt1").unwrap(), VertexLabel::Movie));
    }
}
