//! Store trait and StoreError for cross-thread memory.
//!
//! ## Example
//!
//! ```rust,ignore
//! use weft::memory::{namespace, Store};
//!
//! let ns = namespace(["memories", "user-1"]);
//! store.put(&ns, "some-id", &json!({"data": "User name is Bob"})).await?;
//! let memories = store.search(&ns).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Hierarchical key scope, e.g. `["memories", user_id]`.
///
/// Outlives any single thread; `search` matches by element-wise prefix.
pub type Namespace = Vec<String>;

/// Builds a [`Namespace`] from string parts.
pub fn namespace<I, S>(parts: I) -> Namespace
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

/// Error for store operations. Backend errors are carried as opaque messages.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// JSON or namespace (de)serialization failed.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Backend storage error (e.g. DB I/O).
    #[error("storage: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// A stored value with its key, namespace and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub namespace: Namespace,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cross-thread key/value memory.
///
/// Mutable by any thread at any time; `put` on an existing key overwrites the
/// value in place. No cross-key transactions.
///
/// **Interaction**: attached with `StateGraph::with_store`; nodes read and
/// write it through `NodeContext::store`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts or overwrites `key` in `namespace`.
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError>;

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, StoreError>;

    /// Removes `key`; removing a missing key is not an error.
    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError>;

    /// Items whose namespace starts with `prefix`, in first-insertion order.
    async fn search(&self, prefix: &Namespace) -> Result<Vec<Item>, StoreError>;
}

pub(crate) fn has_prefix(namespace: &Namespace, prefix: &Namespace) -> bool {
    namespace.len() >= prefix.len() && namespace.iter().zip(prefix).all(|(a, b)| a == b)
}
