//! StateSchema: field registry with per-field reducers and defaults.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::channels::Reducer;

use super::{PartialUpdate, StateSnapshot};

/// Names that cannot be used as state fields (graph markers and the
/// interrupt slot used in stream output).
const RESERVED_FIELDS: &[&str] = &["__start__", "__end__", "__interrupt__"];

/// Schema definition error, raised by [`SchemaBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate state field: {0}")]
    DuplicateField(String),
    #[error("reserved name used as state field: {0}")]
    ReservedField(String),
    #[error("state field name must not be empty")]
    EmptyFieldName,
}

/// An update referenced a field the schema does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation: unknown state field `{field}`")]
pub struct SchemaViolation {
    pub field: String,
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    reducer: Reducer,
    default: Value,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Initial value of the field (`null` unless a default was declared).
    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

#[derive(Debug)]
struct SchemaInner {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

/// Ordered set of state fields, each with a reducer.
///
/// Cheap to clone; compiled graphs and checkpoints share one schema.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weft::channels::Reducer;
/// use weft::state::{PartialUpdate, StateSchema};
///
/// let schema = StateSchema::builder()
///     .field_with_default("aggregate", Reducer::Append, json!([]))
///     .field("which", Reducer::LastWins)
///     .build()
///     .unwrap();
///
/// let state = schema.initial_state(&PartialUpdate::new().with("which", "cd")).unwrap();
/// let state = schema
///     .merge(&state, &PartialUpdate::new().with("aggregate", json!(["I'm A"])))
///     .unwrap();
/// assert_eq!(state.get("aggregate"), Some(&json!(["I'm A"])));
/// assert_eq!(state.get_str("which"), Some("cd"));
/// ```
#[derive(Debug, Clone)]
pub struct StateSchema {
    inner: Arc<SchemaInner>,
}

impl StateSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.inner.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.inner.index.contains_key(field)
    }

    pub fn reducer(&self, field: &str) -> Option<&Reducer> {
        self.inner
            .index
            .get(field)
            .map(|&i| &self.inner.fields[i].reducer)
    }

    /// Snapshot holding every field's default.
    pub fn empty_state(&self) -> StateSnapshot {
        let mut state = StateSnapshot::default();
        for spec in &self.inner.fields {
            state.set(&spec.name, spec.default.clone());
        }
        state
    }

    /// Defaults, then `input` merged through the reducers.
    pub fn initial_state(&self, input: &PartialUpdate) -> Result<StateSnapshot, SchemaViolation> {
        self.merge(&self.empty_state(), input)
    }

    /// Fails on the first field of `update` that is not declared.
    pub fn validate(&self, update: &PartialUpdate) -> Result<(), SchemaViolation> {
        match update.fields().find(|f| !self.contains(f)) {
            Some(field) => Err(SchemaViolation {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Applies `update` to `current` and returns the new snapshot.
    ///
    /// Fields absent from `update` are carried over unchanged. The whole
    /// update is validated before any reducer runs, so a violation leaves no
    /// partial result.
    pub fn merge(
        &self,
        current: &StateSnapshot,
        update: &PartialUpdate,
    ) -> Result<StateSnapshot, SchemaViolation> {
        self.merge_all(current, std::iter::once(update))
    }

    /// Applies several updates in iteration order (one step's writes in node
    /// registration order). Either all apply or none.
    pub fn merge_all<'a, I>(
        &self,
        current: &StateSnapshot,
        updates: I,
    ) -> Result<StateSnapshot, SchemaViolation>
    where
        I: IntoIterator<Item = &'a PartialUpdate>,
    {
        let updates: Vec<&PartialUpdate> = updates.into_iter().collect();
        for update in &updates {
            self.validate(update)?;
        }

        let mut next = current.clone();
        for update in updates {
            for (field, incoming) in update.iter() {
                let spec = &self.inner.fields[self.inner.index[field.as_str()]];
                let previous = next.get(field).cloned().unwrap_or(Value::Null);
                let merged = spec.reducer.apply(&previous, incoming.clone());
                next.set(field, merged);
            }
        }
        Ok(next)
    }
}

/// Builder for [`StateSchema`]; errors are reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Declares a field that starts as `null`.
    pub fn field(self, name: impl Into<String>, reducer: Reducer) -> Self {
        self.field_with_default(name, reducer, Value::Null)
    }

    /// Declares a field with an initial value.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        reducer: Reducer,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            reducer,
            default: default.into(),
        });
        self
    }

    pub fn build(self) -> Result<StateSchema, SchemaError> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, spec) in self.fields.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if RESERVED_FIELDS.contains(&spec.name.as_str()) {
                return Err(SchemaError::ReservedField(spec.name.clone()));
            }
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }
        }
        Ok(StateSchema {
            inner: Arc::new(SchemaInner {
                fields: self.fields,
                index,
            }),
        })
    }
}
