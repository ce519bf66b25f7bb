//! GraphSON v3 values
//!
//! Gremlin Server and Neptune answer HTTP requests with GraphSON: every
//! non-JSON-native value is wrapped as `{"@type": "g:...", "@value": ...}`.
//! `GValue` is the decoded form. Plain JSON (untyped GraphSON) decodes too.

use serde_json::Value as Json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unsupported GraphSON type {0}")]
    UnsupportedType(String),

    #[error("malformed {type_name}: {reason}")]
    Malformed {
        type_name: &'static str,
        reason: String,
    },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// `T` tokens used as `elementMap()` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Id,
    Label,
    Key,
    Value,
}

/// Edge endpoints used as `elementMap()` keys on edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    /// Head of the edge (`inV`)
    In,
    /// Tail of the edge (`outV`)
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GVertex {
    pub id: String,
    pub label: String,
    /// Multi-valued properties keep every value in insertion order
    pub properties: Vec<(String, GValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GEdge {
    pub id: String,
    pub label: String,
    pub out_v: String,
    pub in_v: String,
    pub properties: Vec<(String, GValue)>,
}

/// A decoded Gremlin result value
#[derive(Debug, Clone, PartialEq)]
pub enum GValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<GValue>),
    /// Ordered key/value pairs; keys are not restricted to strings
    Map(Vec<(GValue, GValue)>),
    Token(Token),
    EdgeEnd(EdgeEnd),
    Vertex(GVertex),
    Edge(GEdge),
}

impl GValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Look up a map entry by key
    pub fn get(&self, key: &GValue) -> Option<&GValue> {
        match self {
            GValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render an element id. Ids are strings on Neptune and longs on TinkerGraph.
    pub fn id_string(&self) -> Option<String> {
        match self {
            GValue::String(s) => Some(s.clone()),
            GValue::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            GValue::Null => "null",
            GValue::Bool(_) => "bool",
            GValue::Int(_) => "int",
            GValue::Double(_) => "double",
            GValue::String(_) => "string",
            GValue::List(_) => "list",
            GValue::Map(_) => "map",
            GValue::Token(_) => "token",
            GValue::EdgeEnd(_) => "direction",
            GValue::Vertex(_) => "vertex",
            GValue::Edge(_) => "edge",
        }
    }
}

impl From<&str> for GValue {
    fn from(s: &str) -> Self {
        GValue::String(s.to_string())
    }
}

impl From<String> for GValue {
    fn from(s: String) -> Self {
        GValue::String(s)
    }
}

impl From<i64> for GValue {
    fn from(i: i64) -> Self {
        GValue::Int(i)
    }
}

/// Decode a GraphSON document
pub fn from_graphson(json: &Json) -> DecodeResult<GValue> {
    match json {
        Json::Null => Ok(GValue::Null),
        Json::Bool(b) => Ok(GValue::Bool(*b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => GValue::Int(i),
            None => GValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(GValue::String(s.clone())),
        Json::Array(items) => Ok(GValue::List(
            items.iter().map(from_graphson).collect::<DecodeResult<_>>()?,
        )),
        Json::Object(obj) => match (obj.get("@type"), obj.get("@value")) {
            (Some(Json::String(type_name)), Some(value)) => decode_typed(type_name, value),
            _ => {
                let mut entries = Vec::with_capacity(obj.len());
                for (k, v) in obj {
                    entries.push((GValue::String(k.clone()), from_graphson(v)?));
                }
                Ok(GValue::Map(entries))
            }
        },
    }
}

fn malformed(type_name: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        type_name,
        reason: reason.into(),
    }
}

fn decode_typed(type_name: &str, value: &Json) -> DecodeResult<GValue> {
    match type_name {
        "g:Int32" | "g:Int64" | "g:Date" | "g:Timestamp" => value
            .as_i64()
            .map(GValue::Int)
            .ok_or_else(|| malformed("g:Int64", format!("expected integer, got {}", value))),
        "g:Float" | "g:Double" => match value {
            Json::Number(n) => Ok(GValue::Double(n.as_f64().unwrap_or(f64::NAN))),
            Json::String(s) if s == "NaN" => Ok(GValue::Double(f64::NAN)),
            Json::String(s) if s == "Infinity" => Ok(GValue::Double(f64::INFINITY)),
            Json::String(s) if s == "-Infinity" => Ok(GValue::Double(f64::NEG_INFINITY)),
            other => Err(malformed("g:Double", format!("expected number, got {}", other))),
        },
        "g:UUID" => value
            .as_str()
            .map(|s| GValue::String(s.to_string()))
            .ok_or_else(|| malformed("g:UUID", "expected string")),
        "g:List" | "g:Set" => match value {
            Json::Array(items) => Ok(GValue::List(
                items.iter().map(from_graphson).collect::<DecodeResult<_>>()?,
            )),
            other => Err(malformed("g:List", format!("expected array, got {}", other))),
        },
        "g:BulkSet" => decode_bulk_set(value),
        "g:Map" => decode_map(value),
        "g:T" => match value.as_str() {
            Some("id") => Ok(GValue::Token(Token::Id)),
            Some("label") => Ok(GValue::Token(Token::Label)),
            Some("key") => Ok(GValue::Token(Token::Key)),
            Some("value") => Ok(GValue::Token(Token::Value)),
            _ => Err(malformed("g:T", format!("unknown token {}", value))),
        },
        "g:Direction" => match value.as_str() {
            Some("IN") => Ok(GValue::EdgeEnd(EdgeEnd::In)),
            Some("OUT") => Ok(GValue::EdgeEnd(EdgeEnd::Out)),
            _ => Err(malformed("g:Direction", format!("unexpected direction {}", value))),
        },
        "g:Vertex" => decode_vertex(value).map(GValue::Vertex),
        "g:Edge" => decode_edge(value).map(GValue::Edge),
        "g:VertexProperty" | "g:Property" => value
            .get("value")
            .map(from_graphson)
            .unwrap_or_else(|| Err(malformed("g:Property", "missing value"))),
        "g:Traverser" => value
            .get("value")
            .map(from_graphson)
            .unwrap_or_else(|| Err(malformed("g:Traverser", "missing value"))),
        other => Err(DecodeError::UnsupportedType(other.to_string())),
    }
}

fn decode_map(value: &Json) -> DecodeResult<GValue> {
    let flat = value
        .as_array()
        .ok_or_else(|| malformed("g:Map", "expected flat key/value array"))?;
    if flat.len() % 2 != 0 {
        return Err(malformed("g:Map", "odd number of entries"));
    }
    let mut entries = Vec::with_capacity(flat.len() / 2);
    for pair in flat.chunks(2) {
        entries.push((from_graphson(&pair[0])?, from_graphson(&pair[1])?));
    }
    Ok(GValue::Map(entries))
}

/// Upper bound on the items a single `g:BulkSet` may expand to
pub const MAX_BULK_ITEMS: usize = 100_000;

fn decode_bulk_set(value: &Json) -> DecodeResult<GValue> {
    let flat = value
        .as_array()
        .ok_or_else(|| malformed("g:BulkSet", "expected array"))?;
    let mut items = Vec::new();
    for pair in flat.chunks(2) {
        let item = from_graphson(&pair[0])?;
        let bulk = match pair.get(1).map(from_graphson).transpose()? {
            None => 1,
            Some(b) => b
                .as_i64()
                .filter(|n| *n >= 1)
                .ok_or_else(|| malformed("g:BulkSet", "bulk must be a positive integer"))?,
        };
        let bulk = usize::try_from(bulk).unwrap_or(usize::MAX);
        if bulk > MAX_BULK_ITEMS - items.len() {
            return Err(malformed(
                "g:BulkSet",
                format!("expands to more than {} items", MAX_BULK_ITEMS),
            ));
        }
        items.extend(std::iter::repeat(item).take(bulk));
    }
    Ok(GValue::List(items))
}

fn element_id(type_name: &'static str, value: &Json, field: &str) -> DecodeResult<String> {
    let raw = value
        .get(field)
        .ok_or_else(|| malformed(type_name, format!("missing {}", field)))?;
    from_graphson(raw)?
        .id_string()
        .ok_or_else(|| malformed(type_name, format!("{} is not a string or integer", field)))
}

fn element_label(type_name: &'static str, value: &Json) -> DecodeResult<String> {
    value
        .get("label")
        .and_then(Json::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(type_name, "missing label"))
}

fn decode_vertex(value: &Json) -> DecodeResult<GVertex> {
    let id = element_id("g:Vertex", value, "id")?;
    let label = element_label("g:Vertex", value)?;
    let mut properties = Vec::new();
    if let Some(Json::Object(props)) = value.get("properties") {
        for (key, values) in props {
            match values {
                Json::Array(list) => {
                    for vp in list {
                        properties.push((key.clone(), from_graphson(vp)?));
                    }
                }
                single => properties.push((key.clone(), from_graphson(single)?)),
            }
        }
    }
    Ok(GVertex {
        id,
        label,
        properties,
    })
}

fn decode_edge(value: &Json) -> DecodeResult<GEdge> {
    let id = element_id("g:Edge", value, "id")?;
    let label = element_label("g:Edge", value)?;
    let out_v = element_id("g:Edge", value, "outV")?;
    let in_v = element_id("g:Edge", value, "inV")?;
    let mut properties = Vec::new();
    if let Some(Json::Object(props)) = value.get("properties") {
        for (key, prop) in props {
            properties.push((key.clone(), from_graphson(prop)?));
        }
    }
    Ok(GEdge {
        id,
        label,
        out_v,
        in_v,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(
            from_graphson(&json!({"@type": "g:Int64", "@value": 150})).unwrap(),
            GValue::Int(150)
        );
        assert_eq!(
            from_graphson(&json!({"@type": "g:Double", "@value": 7.5})).unwrap(),
            GValue::Double(7.5)
        );
        assert_eq!(from_graphson(&json!("x")).unwrap(), GValue::String("x".into()));
        assert_eq!(from_graphson(&json!(3)).unwrap(), GValue::Int(3));
    }

    #[test]
    fn test_element_map_vertex() {
        let doc = json!({
            "@type": "g:Map",
            "@value": [
                {"@type": "g:T", "@value": "id"}, "nm0001412",
                {"@type": "g:T", "@value": "label"}, "person",
                "primaryName", "Some Actor",
                "birthYear", {"@type": "g:Int32", "@value": 1950}
            ]
        });
        let v = from_graphson(&doc).unwrap();
        assert_eq!(
            v.get(&GValue::Token(Token::Id)),
            Some(&GValue::String("nm0001412".into()))
        );
        assert_eq!(
            v.get(&GValue::String("birthYear".into())),
            Some(&GValue::Int(1950))
        );
    }

    #[test]
    fn test_element_map_edge_endpoints() {
        let doc = json!({
            "@type": "g:Map",
            "@value": [
                {"@type": "g:T", "@value": "id"}, "e7",
                {"@type": "g:T", "@value": "label"}, "appears_in",
                {"@type": "g:Direction", "@value": "IN"},
                {"@type": "g:Map", "@value": [
                    {"@type": "g:T", "@value": "id"}, "tt1",
                    {"@type": "g:T", "@value": "label"}, "movie"
                ]},
                {"@type": "g:Direction", "@value": "OUT"},
                {"@type": "g:Map", "@value": [
                    {"@type": "g:T", "@value": "id"}, "nm1",
                    {"@type": "g:T", "@value": "label"}, "person"
                ]}
            ]
        });
        let e = from_graphson(&doc).unwrap();
        let head = e.get(&GValue::EdgeEnd(EdgeEnd::In)).unwrap();
        assert_eq!(head.get(&GValue::Token(Token::Id)).and_then(GValue::as_str), Some("tt1"));
        let tail = e.get(&GValue::EdgeEnd(EdgeEnd::Out)).unwrap();
        assert_eq!(tail.get(&GValue::Token(Token::Id)).and_then(GValue::as_str), Some("nm1"));
    }

    #[test]
    fn test_reference_vertex_and_edge() {
        let vertex = json!({
            "@type": "g:Vertex",
            "@value": {
                "id": {"@type": "g:Int64", "@value": 1},
                "label": "movie",
                "properties": {
                    "genres": [
                        {"@type": "g:VertexProperty", "@value": {"id": 0, "value": "Drama", "label": "genres"}},
                        {"@type": "g:VertexProperty", "@value": {"id": 1, "value": "Crime", "label": "genres"}}
                    ]
                }
            }
        });
        match from_graphson(&vertex).unwrap() {
            GValue::Vertex(v) => {
                assert_eq!(v.id, "1");
                assert_eq!(v.label, "movie");
                assert_eq!(v.properties.len(), 2);
            }
            other => panic!("expected vertex, got {:?}", other),
        }

        let edge = json!({
            "@type": "g:Edge",
            "@value": {
                "id": "e1", "label": "appears_in",
                "inVLabel": "movie", "outVLabel": "person",
                "inV": "tt1", "outV": "nm1"
            }
        });
        match from_graphson(&edge).unwrap() {
            GValue::Edge(e) => {
                assert_eq!((e.out_v.as_str(), e.in_v.as_str()), ("nm1", "tt1"));
                assert!(e.properties.is_empty());
            }
            other => panic!("expected edge, got {:?}", other),
        }
    }

    #[test]
    fn test_bulk_set_expands() {
        let doc = json!({"@type": "g:BulkSet", "@value": ["a", {"@type": "g:Int64", "@value": 2}, "b", {"@type": "g:Int64", "@value": 1}]});
        assert_eq!(
            from_graphson(&doc).unwrap(),
            GValue::List(vec!["a".into(), "a".into(), "b".into()])
        );
    }

    #[test]
    fn test_bulk_set_expansion_is_bounded() {
        let huge = json!({"@type": "g:BulkSet", "@value": ["a", {"@type": "g:Int64", "@value": i64::MAX}]});
        assert!(matches!(
            from_graphson(&huge),
            Err(DecodeError::Malformed { type_name: "g:BulkSet", .. })
        ));

        let cumulative = json!({"@type": "g:BulkSet", "@value": [
            "a", {"@type": "g:Int64", "@value": MAX_BULK_ITEMS as i64},
            "b", {"@type": "g:Int64", "@value": 1}
        ]});
        assert!(from_graphson(&cumulative).is_err());

        let exact = json!({"@type": "g:BulkSet", "@value": ["a", {"@type": "g:Int64", "@value": MAX_BULK_ITEMS as i64}]});
        match from_graphson(&exact).unwrap() {
            GValue::List(items) => assert_eq!(items.len(), MAX_BULK_ITEMS),
            other => panic!("unexpected {:?}", other),
        }

        let negative = json!({"@type": "g:BulkSet", "@value": ["a", {"@type": "g:Int64", "@value": -3}]});
        assert!(from_graphson(&negative).is_err());
    }
}
