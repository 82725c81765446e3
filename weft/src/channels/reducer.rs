//! Reducer: how one field combines its current value with an update.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Custom merge function: `(current, incoming) -> merged`.
///
/// Must be pure; the executor may call it several times per step (once per
/// writing node, in node registration order).
pub type ReducerFn = Arc<dyn Fn(&Value, Value) -> Value + Send + Sync>;

/// Merge rule for a single state field.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weft::channels::Reducer;
///
/// let merged = Reducer::Append.apply(&json!(["a"]), json!(["b", "c"]));
/// assert_eq!(merged, json!(["a", "b", "c"]));
///
/// let replaced = Reducer::LastWins.apply(&json!("old"), json!("new"));
/// assert_eq!(replaced, json!("new"));
/// ```
#[derive(Clone)]
pub enum Reducer {
    /// List concatenation. A null current value counts as an empty list; an
    /// array update is appended element-wise, any other value is pushed as one element.
    Append,
    /// The incoming value replaces the current one.
    LastWins,
    /// Caller-supplied merge.
    Custom(ReducerFn),
}

impl Reducer {
    /// Wraps a closure as a `Custom` reducer.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, Value) -> Value + Send + Sync + 'static,
    {
        Reducer::Custom(Arc::new(f))
    }

    /// Combines `current` with `incoming` and returns the merged value.
    pub fn apply(&self, current: &Value, incoming: Value) -> Value {
        match self {
            Reducer::Append => append(current, incoming),
            Reducer::LastWins => incoming,
            Reducer::Custom(f) => f(current, incoming),
        }
    }

    /// Short name used in logs and graph rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            Reducer::Append => "append",
            Reducer::LastWins => "last_wins",
            Reducer::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Append => f.write_str("Append"),
            Reducer::LastWins => f.write_str("LastWins"),
            Reducer::Custom(_) => f.write_str("Custom(<function>)"),
        }
    }
}

fn append(current: &Value, incoming: Value) -> Value {
    let mut items = match current {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    match incoming {
        Value::Array(more) => items.extend(more),
        one => items.push(one),
    }
    Value::Array(items)
}
