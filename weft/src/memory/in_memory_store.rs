//! In-memory Store. Not persistent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::memory::store::{has_prefix, Item, Namespace, Store, StoreError};

#[derive(Debug, Clone)]
struct StoredItem {
    seq: u64,
    value: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    items: HashMap<(Namespace, String), StoredItem>,
    next_seq: u64,
}

/// In-memory Store. Not persistent.
///
/// Each entry keeps the sequence number of its first insertion so `search`
/// returns insertion order even after overwrites.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let now = Utc::now();
        let map_key = (namespace.clone(), key.to_string());
        if let Some(existing) = guard.items.get_mut(&map_key) {
            existing.value = value.clone();
            existing.updated_at = now;
            return Ok(());
        }
        let seq = guard.next_seq;
        guard.next_seq += 1;
        guard.items.insert(
            map_key,
            StoredItem {
                seq,
                value: value.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Item>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .items
            .get(&(namespace.clone(), key.to_string()))
            .map(|s| Item {
                namespace: namespace.clone(),
                key: key.to_string(),
                value: s.value.clone(),
                created_at: s.created_at,
                updated_at: s.updated_at,
            }))
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.items.remove(&(namespace.clone(), key.to_string()));
        Ok(())
    }

    async fn search(&self, prefix: &Namespace) -> Result<Vec<Item>, StoreError> {
        let guard = self.inner.read().await;
        let mut hits: Vec<(u64, Item)> = guard
            .items
            .iter()
            .filter(|((ns, _), _)| has_prefix(ns, prefix))
            .map(|((ns, key), s)| {
                (
                    s.seq,
                    Item {
                        namespace: ns.clone(),
                        key: key.clone(),
                        value: s.value.clone(),
                        created_at: s.created_at,
                        updated_at: s.updated_at,
                    },
                )
            })
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        Ok(hits.into_iter().map(|(_, item)| item).collect())
    }
}
