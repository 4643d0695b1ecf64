//! In-memory vector store backend using cosine distance.
//!
//! Backed by a `HashMap` behind a `tokio::sync::RwLock`. Suitable for
//! development and tests; nothing survives a restart.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedRecord, ScoredChunk};
use crate::error::{DocuMindError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] using cosine distance for search.
///
/// Collections are nested maps: collection name → record id → record.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, IndexedRecord>>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_collection(op: &str, collection: &str) -> DocuMindError {
    let message = format!("collection '{collection}' does not exist");
    match op {
        "upsert" => DocuMindError::IndexWrite { backend: "in-memory".into(), message },
        _ => DocuMindError::IndexRead { backend: "in-memory".into(), message },
    }
}

/// Cosine distance between two vectors: `1 − cos(a, b)`.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn ensure_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn recreate_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.insert(name.to_string(), HashMap::new());
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[IndexedRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| missing_collection("upsert", collection))?;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| missing_collection("search", collection))?;

        let mut scored: Vec<ScoredChunk> = store
            .values()
            .map(|record| ScoredChunk {
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(&record.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_source(&self, collection: &str, source_file: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| missing_collection("delete", collection))?;

        let before = store.len();
        store.retain(|_, record| record.metadata.source_file != source_file);
        Ok(store.len() < before)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store =
            collections.get(collection).ok_or_else(|| missing_collection("count", collection))?;
        Ok(store.len())
    }

    async fn sources(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| missing_collection("sources", collection))?;

        let sources: BTreeSet<String> =
            store.values().map(|record| record.metadata.source_file.clone()).collect();
        Ok(sources.into_iter().collect())
    }
}
