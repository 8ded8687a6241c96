//! `StructuredValue` — the neutral JSON-shaped value traded across every
//! component boundary (tool input/output, manifests, job records).
//!
//! Ordering matters: arrays are ordered lists, and object keys preserve
//! insertion order (not re-sorted), since manifests and job summaries are
//! rendered for humans as well as machines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An ordered string-keyed mapping. A thin newtype over `Vec<(String, V)>`
/// so that re-serialization preserves insertion order, unlike `HashMap`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap(Vec<(String, StructuredValue)>);

impl OrderedMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: StructuredValue) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StructuredValue)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, StructuredValue)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (String, StructuredValue)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// The neutral JSON-shaped value used at every AutoSage boundary.
///
/// Equality and serialization are structural: two values constructed
/// differently but holding the same logical content compare equal and
/// round-trip byte-for-byte through JSON (modulo key order, which this
/// type preserves explicitly via [`OrderedMap`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StructuredValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<StructuredValue>),
    Object(OrderedMap),
}

impl StructuredValue {
    pub fn object(pairs: impl IntoIterator<Item = (String, StructuredValue)>) -> Self {
        StructuredValue::Object(pairs.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StructuredValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&OrderedMap> {
        match self {
            StructuredValue::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[StructuredValue]> {
        match self {
            StructuredValue::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StructuredValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StructuredValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StructuredValue::Null)
    }

    /// The JSON Schema `type` tag this value would satisfy (used by schema
    /// validation). Integers and floats are both reported as `"number"` —
    /// the narrow schema subset this type supports does not distinguish them.
    pub fn type_tag(&self) -> &'static str {
        match self {
            StructuredValue::Null => "null",
            StructuredValue::Bool(_) => "boolean",
            StructuredValue::Number(_) => "number",
            StructuredValue::String(_) => "string",
            StructuredValue::Array(_) => "array",
            StructuredValue::Object(_) => "object",
        }
    }
}

impl From<serde_json::Value> for StructuredValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => StructuredValue::Null,
            serde_json::Value::Bool(b) => StructuredValue::Bool(b),
            serde_json::Value::Number(n) => StructuredValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => StructuredValue::String(s),
            serde_json::Value::Array(a) => {
                StructuredValue::Array(a.into_iter().map(StructuredValue::from).collect())
            }
            serde_json::Value::Object(o) => StructuredValue::Object(
                o.into_iter()
                    .map(|(k, v)| (k, StructuredValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<StructuredValue> for serde_json::Value {
    fn from(v: StructuredValue) -> Self {
        match v {
            StructuredValue::Null => serde_json::Value::Null,
            StructuredValue::Bool(b) => serde_json::Value::Bool(b),
            StructuredValue::Number(n) => serde_json::json!(n),
            StructuredValue::String(s) => serde_json::Value::String(s),
            StructuredValue::Array(a) => {
                serde_json::Value::Array(a.into_iter().map(Into::into).collect())
            }
            StructuredValue::Object(o) => serde_json::Value::Object(
                o.0.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

// Serde is implemented manually against `serde_json::Value` so that the
// wire format is plain JSON while the in-memory representation preserves
// key order via `OrderedMap`.
impl Serialize for StructuredValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let json: serde_json::Value = self.clone().into();
        json.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StructuredValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(StructuredValue::from(json))
    }
}

/// Sorted rendering helper for diagnostics (doctor/CLI output); not used on
/// the hot path since `OrderedMap` already preserves insertion order.
pub fn sorted_keys(map: &OrderedMap) -> BTreeMap<&str, &StructuredValue> {
    map.iter().map(|(k, v)| (k.as_str(), v)).collect()
}
