//! Property values of the document tree.

use indexmap::IndexMap;

use crate::reference::Reference;

/// Insertion-ordered property map.
pub type Properties = IndexMap<String, Value>;

/// A node in the document tree. References stay unresolved until render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Map(Properties),
    Ref(Reference),
    /// `Fn::Join` of `parts` with `delimiter`.
    Join { delimiter: String, parts: Vec<Value> },
}

impl Value {
    /// Empty map, rendered as `{}`.
    pub fn empty_map() -> Self {
        Value::Map(Properties::new())
    }

    /// Build a map from `(key, value)` pairs, keeping their order.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list from anything convertible into values.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Join string fragments without a delimiter.
    pub fn join<S: Into<String>>(parts: impl IntoIterator<Item = S>) -> Self {
        Value::Join {
            delimiter: String::new(),
            parts: parts.into_iter().map(|p| Value::Str(p.into())).collect(),
        }
    }

    /// Visit every reference in this subtree, depth first.
    pub fn for_each_reference<'a>(&'a self, visit: &mut impl FnMut(&'a Reference)) {
        match self {
            Value::Ref(reference) => visit(reference),
            Value::List(items) => items.iter().for_each(|v| v.for_each_reference(visit)),
            Value::Map(map) => map.values().for_each(|v| v.for_each_reference(visit)),
            Value::Join { parts, .. } => parts.iter().for_each(|v| v.for_each_reference(visit)),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Str(_) => {}
        }
    }

    /// Convert to JSON, rendering references with `suffix_token`.
    pub fn to_json(&self, suffix_token: &str) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(|v| v.to_json(suffix_token)).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json(suffix_token)))
                    .collect(),
            ),
            Value::Ref(reference) => reference.to_json(suffix_token),
            Value::Join { delimiter, parts } => serde_json::json!({
                "Fn::Join": [
                    delimiter,
                    parts.iter().map(|v| v.to_json(suffix_token)).collect::<Vec<_>>()
                ]
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}

impl From<Properties> for Value {
    fn from(map: Properties) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
