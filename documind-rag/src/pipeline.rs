//! Pipeline orchestrator: ingest and query composition.
//!
//! [`Pipeline`] wires extractor → chunker → embedder → index on ingest,
//! and index → answer generator on query. It is built once at process
//! start-up and shared across requests (typically behind an `Arc`): it
//! owns the single initialized connection to each remote resource, so
//! request handlers receive it as their context object instead of
//! re-instantiating clients per call.
//!
//! Files are processed strictly sequentially: one file, one batch, one
//! remote call at a time, keeping load on remote rate limits bounded.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::{HfTokenizer, TokenChunker, Tokenizer};
use crate::config::DocuMindConfig;
use crate::document::{
    Document, FileOutcome, FileType, IndexedRecord, IngestReport, QueryAnswer, SourceRef,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{DocuMindError, Result};
use crate::extract;
use crate::generation::AnswerGenerator;
use crate::index::DocumentIndex;
use crate::openai::{OpenAIChat, OpenAIEmbedding};
use crate::qdrant::QdrantStore;
use crate::vectorstore::VectorStore;

/// Fixed answer returned when retrieval finds nothing; no generation
/// call is made in that case.
pub const NO_RELEVANT_INFO_ANSWER: &str =
    "I couldn't find any relevant information in your knowledge base for this question.";

/// Fixed fallback answer returned when the generation call fails.
pub const GENERATION_FALLBACK_ANSWER: &str =
    "I encountered an error while generating the answer, try asking again.";

/// A file as supplied by the request boundary: a name and raw bytes.
///
/// The file type is declared by the filename extension.
#[derive(Debug, Clone)]
pub struct RawFile {
    /// The filename, used as source identity in the index.
    pub filename: String,
    /// The raw file content.
    pub bytes: Vec<u8>,
}

impl RawFile {
    /// Create a new raw file.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { filename: filename.into(), bytes }
    }
}

/// The DocuMind pipeline orchestrator.
pub struct Pipeline {
    config: DocuMindConfig,
    chunker: TokenChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: DocumentIndex,
    generator: Arc<dyn AnswerGenerator>,
}

impl Pipeline {
    /// Assemble a pipeline from its parts.
    ///
    /// Opens (creating if necessary) the configured index collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Config`] for invalid chunking parameters
    /// and propagates index-open failures.
    pub async fn new(
        config: DocuMindConfig,
        tokenizer: Arc<dyn Tokenizer>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        let chunker = TokenChunker::new(tokenizer, config.chunk_size, config.chunk_overlap)?;
        let index = DocumentIndex::open(
            store,
            Arc::clone(&embedder),
            config.collection_name.clone(),
            config.embedding_dimensions,
        )
        .await?;

        Ok(Self { config, chunker, embedder, index, generator })
    }

    /// Assemble the production pipeline: HuggingFace tokenizer file,
    /// OpenAI embedding and chat providers (keyed by `OPENAI_API_KEY`),
    /// and a Qdrant-backed index.
    pub async fn from_config(config: DocuMindConfig) -> Result<Self> {
        let tokenizer: Arc<dyn Tokenizer> =
            Arc::new(HfTokenizer::from_file(&config.tokenizer_path)?);
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAIEmbedding::from_env(
            config.embedding_model.clone(),
            config.embedding_dimensions,
        )?);
        let generator: Arc<dyn AnswerGenerator> =
            Arc::new(OpenAIChat::from_env(config.generation_model.clone())?);
        let store: Arc<dyn VectorStore> = Arc::new(QdrantStore::new(&config.qdrant_url)?);

        Self::new(config, tokenizer, embedder, store, generator).await
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &DocuMindConfig {
        &self.config
    }

    /// The vector index (for stats, delete, and clear maintenance).
    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// Ingest a single file: extract → chunk → embed → index.
    ///
    /// Content that chunks to nothing (empty or whitespace-only) reports
    /// zero chunks added and is a success, not an error. Re-ingesting a
    /// filename removes its previous records so a smaller chunk count
    /// cannot leave stale chunks behind; content that now chunks to
    /// nothing removes every previous record for the file.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::UnsupportedFileType`] before any
    /// extraction work for extensions other than pdf/txt/md, and
    /// propagates extraction, embedding, and index-write failures.
    pub async fn ingest_file(&self, file: &RawFile) -> Result<FileOutcome> {
        let extension = Path::new(&file.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let file_type = FileType::from_extension(extension)
            .ok_or_else(|| DocuMindError::UnsupportedFileType(file.filename.clone()))?;

        let content = extract::extract_text(&file.filename, &file.bytes, file_type)?;
        let document = Document { filename: file.filename.clone(), content, file_type };

        let chunks = self.chunker.chunk_document(&document)?;
        if chunks.is_empty() {
            // An empty re-ingest still supersedes the previous records.
            if self.index.delete_by_source(&file.filename).await {
                debug!(file = %file.filename, "removed records from previous ingest");
            }
            info!(file = %file.filename, chunks_added = 0, "ingested file (no content)");
            return Ok(FileOutcome { filename: file.filename.clone(), chunks_added: 0 });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_all(&texts, self.config.embed_batch_size).await?;

        let records: Vec<IndexedRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedRecord {
                id: format!("{}_{}", file.filename, chunk.metadata.chunk_index),
                embedding,
                text: chunk.text,
                metadata: chunk.metadata,
            })
            .collect();

        // Drop any records left over from a previous ingest of this
        // filename; a shrinking chunk count must not orphan old chunks.
        if self.index.delete_by_source(&file.filename).await {
            debug!(file = %file.filename, "removed records from previous ingest");
        }

        let chunks_added = self.index.insert(&records).await?;
        info!(file = %file.filename, chunks_added, "ingested file");
        Ok(FileOutcome { filename: file.filename.clone(), chunks_added })
    }

    /// Ingest a batch of files independently.
    ///
    /// One file's failure never aborts the rest: errors are collected
    /// per file and reported alongside the successes. Always returns a
    /// report, even under total failure.
    pub async fn ingest_all(&self, files: &[RawFile]) -> IngestReport {
        let mut report = IngestReport { total: files.len(), ..IngestReport::default() };

        for file in files {
            match self.ingest_file(file).await {
                Ok(outcome) => report.processed.push(outcome),
                Err(e) => {
                    error!(file = %file.filename, error = %e, "file ingestion failed");
                    report.errors.push(format!("{}: {e}", file.filename));
                }
            }
        }

        info!(
            processed = report.processed.len(),
            total = report.total,
            errors = report.errors.len(),
            "ingestion run finished"
        );
        report
    }

    /// Ingest every supported file in the configured documents folder.
    ///
    /// Unsupported extensions are skipped without an error. A missing
    /// folder is created and yields an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Extraction`] if the folder cannot be
    /// read or created.
    pub async fn ingest_directory(&self) -> Result<IngestReport> {
        let dir = &self.config.documents_dir;
        let dir_error = |e: std::io::Error| DocuMindError::Extraction {
            file: dir.display().to_string(),
            message: e.to_string(),
        };

        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(dir_error)?;
            info!(dir = %dir.display(), "created documents folder");
            return Ok(IngestReport::default());
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(dir_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(dir_error)? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if FileType::from_extension(extension).is_none() {
                debug!(file = %path.display(), "skipping unsupported file");
                continue;
            }
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let bytes = tokio::fs::read(&path).await.map_err(dir_error)?;
            files.push(RawFile::new(filename, bytes));
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(self.ingest_all(&files).await)
    }

    /// Answer a query from the indexed corpus.
    ///
    /// Retrieves the `top_k` nearest chunks; with no hits the fixed
    /// no-information answer is returned without a generation call.
    /// A failed generation call degrades to a fixed fallback answer;
    /// the request still returns a structured result.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::EmptyQuery`] for empty or
    /// whitespace-only query text, rejected before retrieval.
    pub async fn query(&self, query_text: &str, top_k: usize) -> Result<QueryAnswer> {
        if query_text.trim().is_empty() {
            return Err(DocuMindError::EmptyQuery);
        }

        let hits = self.index.query(query_text, top_k).await;
        if hits.is_empty() {
            info!(chunks_used = 0, "query found no relevant chunks");
            return Ok(QueryAnswer {
                query: query_text.to_string(),
                answer: NO_RELEVANT_INFO_ANSWER.to_string(),
                sources: Vec::new(),
                chunks_used: 0,
            });
        }

        let context: Vec<String> = hits.iter().map(|hit| hit.text.clone()).collect();
        let answer = match self
            .generator
            .generate(query_text, &context, self.config.max_answer_tokens)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "answer generation failed, returning fallback");
                GENERATION_FALLBACK_ANSWER.to_string()
            }
        };

        let sources: Vec<SourceRef> = hits
            .iter()
            .map(|hit| SourceRef {
                text: hit.text.clone(),
                source_file: hit.metadata.source_file.clone(),
                chunk_index: hit.metadata.chunk_index,
            })
            .collect();

        info!(chunks_used = hits.len(), "query completed");
        Ok(QueryAnswer {
            query: query_text.to_string(),
            answer,
            chunks_used: sources.len(),
            sources,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
