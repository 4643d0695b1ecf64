//! The vector index: a persistent named collection of chunk records.
//!
//! [`DocumentIndex`] composes a [`VectorStore`] backend with the
//! embedding provider used at ingest time, so queries are embedded with
//! the exact model the indexed vectors came from. Write failures
//! propagate; failures on the read/maintenance paths (`query`, `stats`,
//! `delete_by_source`, `clear`) degrade to empty/zero/false results
//! with a warning instead of failing the request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::document::{IndexStats, IndexedRecord, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{DocuMindError, Result};
use crate::vectorstore::VectorStore;

/// A persistent named collection keyed by record id.
pub struct DocumentIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection: String,
    dimensions: usize,
}

impl DocumentIndex {
    /// Open (creating if necessary) the named collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::DimensionMismatch`] if the embedding
    /// provider's dimensionality differs from `dimensions`: a query
    /// embedded at a different size than the indexed vectors can never
    /// match, so this is rejected at startup. Propagates
    /// [`DocuMindError::IndexWrite`] if the collection cannot be created.
    pub async fn open(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        collection: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        if embedder.dimensions() != dimensions {
            return Err(DocuMindError::DimensionMismatch {
                expected: dimensions,
                actual: embedder.dimensions(),
            });
        }

        let collection = collection.into();
        store.ensure_collection(&collection, dimensions).await?;
        info!(collection = %collection, dimensions, "vector index ready");
        Ok(Self { store, embedder, collection, dimensions })
    }

    /// The collection name this index operates on.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert records into the collection.
    ///
    /// Returns the number of records inserted; empty input returns 0
    /// without touching the store. Re-inserting an existing id
    /// overwrites the previous record.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::DimensionMismatch`] if any record's
    /// embedding length differs from the configured dimensionality, and
    /// propagates [`DocuMindError::IndexWrite`] on storage failure.
    pub async fn insert(&self, records: &[IndexedRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        for record in records {
            if record.embedding.len() != self.dimensions {
                return Err(DocuMindError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: record.embedding.len(),
                });
            }
        }

        self.store.upsert(&self.collection, records).await?;
        debug!(collection = %self.collection, count = records.len(), "inserted records");
        Ok(records.len())
    }

    /// Embed `query_text` and return the `top_k` nearest chunks,
    /// ordered by ascending cosine distance.
    ///
    /// Remote/storage failures degrade to an empty result; an empty
    /// collection also yields an empty result, not an error.
    pub async fn query(&self, query_text: &str, top_k: usize) -> Vec<ScoredChunk> {
        let embedding = match self.embedder.embed(query_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "query embedding failed");
                return Vec::new();
            }
        };

        match self.store.search(&self.collection, &embedding, top_k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "index search failed");
                Vec::new()
            }
        }
    }

    /// Aggregate statistics reflecting the current stored state.
    ///
    /// A failed count degrades to zeroed stats. A failed source listing
    /// keeps the count and degrades only the source fields, so partial
    /// information is not thrown away.
    pub async fn stats(&self) -> IndexStats {
        let total_chunks = match self.store.count(&self.collection).await {
            Ok(count) => count,
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "index count failed");
                return IndexStats::default();
            }
        };

        if total_chunks == 0 {
            return IndexStats::default();
        }

        let source_files = match self.store.sources(&self.collection).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "index source listing failed");
                return IndexStats { total_chunks, ..IndexStats::default() };
            }
        };

        IndexStats { total_chunks, unique_documents: source_files.len(), source_files }
    }

    /// Remove every record ingested from `source_file`.
    ///
    /// Returns `true` if at least one record was removed; `false` if no
    /// record matched or the backend call failed.
    pub async fn delete_by_source(&self, source_file: &str) -> bool {
        match self.store.delete_by_source(&self.collection, source_file).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(collection = %self.collection, source_file, error = %e, "delete by source failed");
                false
            }
        }
    }

    /// Destroy and recreate the collection with identical configuration.
    ///
    /// After a successful clear, [`stats()`](Self::stats) reports zero
    /// immediately. Returns `false` if the backend call failed.
    pub async fn clear(&self) -> bool {
        match self.store.recreate_collection(&self.collection, self.dimensions).await {
            Ok(()) => {
                info!(collection = %self.collection, "cleared vector index");
                true
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "clear failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("collection", &self.collection)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}
