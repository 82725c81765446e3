//! Document retrieval: query in, ranked documents out.
//!
//! [`InMemoryRetriever`] ranks by how many distinct query terms a document
//! contains (case-insensitive, alphanumeric tokens). Documents that share no
//! term with the query are not returned; ties keep insertion order.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// A retrievable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Retrieval service used by retrieval-augmented nodes.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` documents for `query`, best first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, NodeError>;
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// In-memory retriever over a fixed document set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    documents: Vec<Document>,
}

impl InMemoryRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn add(&mut self, document: Document) {
        self.documents.push(document);
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, NodeError> {
        let wanted = terms(query);
        let mut scored: Vec<(usize, usize, &Document)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (terms(&doc.content).intersection(&wanted).count(), i, doc))
            .filter(|(score, _, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, _, doc)| doc.clone())
            .collect())
    }
}
