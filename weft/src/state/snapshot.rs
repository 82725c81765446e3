//! StateSnapshot and PartialUpdate value types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable view of the graph state at a step boundary.
///
/// Keys are the schema's field names in declaration order. Produced by
/// [`StateSchema`](super::StateSchema); nodes receive it by reference and
/// never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot(Map<String, Value>);

impl StateSnapshot {
    /// Returns the value of `field`, or `None` when the field is absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns `field` as a string slice when it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns `field` as a slice when it holds an array; null and missing fields read as empty.
    pub fn get_array(&self, field: &str) -> &[Value] {
        match self.0.get(field) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The snapshot as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub(crate) fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }
}

impl From<Map<String, Value>> for StateSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        StateSnapshot(map)
    }
}

/// Field updates written by a node or supplied as invocation input.
///
/// Every key must be a schema field; the value is passed to that field's reducer.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weft::state::PartialUpdate;
///
/// let update = PartialUpdate::new()
///     .with("aggregate", json!(["I'm A"]))
///     .with("which", "cd");
/// assert_eq!(update.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialUpdate(Map<String, Value>);

impl PartialUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets `field` to `value`, replacing an earlier write to the same field in this update.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field names in write order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for PartialUpdate {
    fn from(map: Map<String, Value>) -> Self {
        PartialUpdate(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PartialUpdate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PartialUpdate(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for PartialUpdate {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
