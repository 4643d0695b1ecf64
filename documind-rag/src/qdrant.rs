//! Qdrant vector store backend.
//!
//! Implements [`VectorStore`] over the [qdrant-client](https://docs.rs/qdrant-client)
//! gRPC client. Collections use cosine distance; record text and metadata
//! are stored as point payload. Qdrant point ids must be integers or
//! UUIDs, so the deterministic record id (`{source_file}_{chunk_index}`)
//! is mapped to a v5 UUID and kept in the payload verbatim; re-inserting
//! the same record id therefore overwrites the existing point.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{ChunkMetadata, IndexedRecord, ScoredChunk};
use crate::error::{DocuMindError, Result};
use crate::vectorstore::VectorStore;

/// Page size used when scrolling a collection for distinct sources.
const SCROLL_PAGE_SIZE: u32 = 256;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// The single shared mutable resource of the pipeline; Qdrant itself
/// serializes conflicting writes.
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Create a new store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(|e| DocuMindError::IndexWrite {
            backend: "qdrant".to_string(),
            message: format!("failed to connect: {e}"),
        })?;
        Ok(Self { client })
    }

    /// Create a new store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn write_err(e: qdrant_client::QdrantError) -> DocuMindError {
        DocuMindError::IndexWrite { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn read_err(e: qdrant_client::QdrantError) -> DocuMindError {
        DocuMindError::IndexRead { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Deterministic Qdrant point id for a record id.
    fn point_id(record_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, record_id.as_bytes()).to_string()
    }

    /// Filter matching every point ingested from one source file.
    fn source_filter(source_file: &str) -> Filter {
        Filter::must([Condition::matches("metadata.source_file", source_file.to_string())])
    }

    fn payload_for(record: &IndexedRecord) -> Result<Payload> {
        let value = serde_json::json!({
            "record_id": record.id,
            "text": record.text,
            "metadata": record.metadata,
        });
        Payload::try_from(value).map_err(|e| DocuMindError::IndexWrite {
            backend: "qdrant".to_string(),
            message: format!("failed to build payload: {e}"),
        })
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn extract_integer(value: &QdrantValue) -> Option<usize> {
        match &value.kind {
            Some(Kind::IntegerValue(i)) => usize::try_from(*i).ok(),
            _ => None,
        }
    }

    fn extract_metadata(payload: &HashMap<String, QdrantValue>) -> ChunkMetadata {
        let fields = payload.get("metadata").and_then(|v| match &v.kind {
            Some(Kind::StructValue(s)) => Some(&s.fields),
            _ => None,
        });

        match fields {
            Some(fields) => ChunkMetadata {
                source_file: fields
                    .get("source_file")
                    .and_then(Self::extract_string)
                    .unwrap_or_default(),
                chunk_index: fields
                    .get("chunk_index")
                    .and_then(Self::extract_integer)
                    .unwrap_or_default(),
                total_chunks: fields
                    .get("total_chunks")
                    .and_then(Self::extract_integer)
                    .unwrap_or_default(),
            },
            None => ChunkMetadata {
                source_file: String::new(),
                chunk_index: 0,
                total_chunks: 0,
            },
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::write_err)?;
        if collections.collections.iter().any(|c| c.name == name) {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::write_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn recreate_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::read_err)?;
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::read_err)?;

        debug!(collection = name, dimensions, "recreated qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[IndexedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points = records
            .iter()
            .map(|record| {
                Ok(PointStruct::new(
                    Self::point_id(&record.id),
                    record.embedding.clone(),
                    Self::payload_for(record)?,
                ))
            })
            .collect::<Result<Vec<PointStruct>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::write_err)?;

        debug!(collection, count = records.len(), "upserted records to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::read_err)?;

        // Qdrant reports cosine similarity (higher is better); callers
        // expect cosine distance, ascending.
        Ok(response
            .result
            .into_iter()
            .map(|scored| ScoredChunk {
                text: scored
                    .payload
                    .get("text")
                    .and_then(Self::extract_string)
                    .unwrap_or_default(),
                metadata: Self::extract_metadata(&scored.payload),
                distance: 1.0 - scored.score,
            })
            .collect())
    }

    async fn delete_by_source(&self, collection: &str, source_file: &str) -> Result<bool> {
        let matched = self
            .client
            .count(
                CountPointsBuilder::new(collection)
                    .filter(Self::source_filter(source_file))
                    .exact(true),
            )
            .await
            .map_err(Self::read_err)?
            .result
            .map(|r| r.count)
            .unwrap_or(0);

        if matched == 0 {
            return Ok(false);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(Self::source_filter(source_file))
                    .wait(true),
            )
            .await
            .map_err(Self::read_err)?;

        debug!(collection, source_file, count = matched, "deleted records from qdrant");
        Ok(true)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::read_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    async fn sources(&self, collection: &str) -> Result<Vec<String>> {
        let mut sources = BTreeSet::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(collection)
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true);
            if let Some(o) = offset.take() {
                request = request.offset(o);
            }

            let response = self.client.scroll(request).await.map_err(Self::read_err)?;
            for point in response.result {
                let metadata = Self::extract_metadata(&point.payload);
                if !metadata.source_file.is_empty() {
                    sources.insert(metadata.source_file);
                }
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(sources.into_iter().collect())
    }
}
