//! Graph state: the schema, immutable snapshots, and partial updates.
//!
//! A [`StateSchema`] names every field and its [`Reducer`](crate::channels::Reducer).
//! [`StateSnapshot`] is the committed state (exactly the schema's fields, in
//! declaration order). [`PartialUpdate`] is what nodes and callers write; it is
//! merged through the reducers with [`StateSchema::merge`].

mod schema;
mod snapshot;

pub use schema::{FieldSpec, SchemaBuilder, SchemaError, SchemaViolation, StateSchema};
pub use snapshot::{PartialUpdate, StateSnapshot};
