//! Property values carried by vertices and edges
//!
//! The property bag is open: keys vary by label (`primaryTitle`,
//! `primaryName`, ...) and are passed through without shape validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property value as it appears on the wire
///
/// Serialized untagged, so `{"startYear": 1994}` stays a plain JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<PropertyValue>),
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

/// Property map. Ordered so responses serialize deterministically.
pub type PropertyMap = BTreeMap<String, PropertyValue>;
