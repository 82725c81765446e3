//! Per-field merge rules for graph state.
//!
//! Each field of a [`StateSchema`](crate::state::StateSchema) carries a
//! [`Reducer`] that decides how an incoming value combines with the field's
//! current value:
//!
//! - `Append`: list concatenation (message history, fan-in aggregation)
//! - `LastWins`: the incoming value replaces the current one
//! - `Custom`: a caller-supplied pure function `(current, incoming) -> merged`

mod reducer;

pub use reducer::{Reducer, ReducerFn};
