//! Vector store backend trait.

use async_trait::async_trait;

use crate::document::{IndexedRecord, ScoredChunk};
use crate::error::Result;

/// A storage backend for the vector index.
///
/// Implementations manage a named collection of [`IndexedRecord`]s and
/// support upserting, similarity search, source-level deletion, and
/// aggregate reads. The underlying engine is responsible for serializing
/// conflicting writes; this layer performs no locking of its own.
///
/// Upserting a record whose id already exists overwrites the previous
/// record.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the named collection if it does not exist yet.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Destroy and recreate the named collection with identical
    /// configuration, discarding all records.
    async fn recreate_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Upsert records into a collection, keyed by record id.
    async fn upsert(&self, collection: &str, records: &[IndexedRecord]) -> Result<()>;

    /// Search for the `top_k` records nearest to `embedding`.
    ///
    /// Returns results ordered by ascending cosine distance (nearest
    /// first). An empty collection yields an empty result.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Delete every record whose `source_file` matches.
    ///
    /// Returns `true` if at least one record was removed, `false` if no
    /// record matched.
    async fn delete_by_source(&self, collection: &str, source_file: &str) -> Result<bool>;

    /// Count the records currently stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Return the sorted list of distinct `source_file` values.
    async fn sources(&self, collection: &str) -> Result<Vec<String>>;
}
