//! Retrieval-augmented question answering over a personal document corpus.
//!
//! DocuMind ingests files (PDF, plain text, markdown), splits them into
//! overlapping token-bounded chunks, embeds the chunks with a remote
//! embedding model, and indexes them in a persistent vector collection.
//! Queries retrieve the nearest chunks by cosine distance and ground a
//! single generated answer in them.
//!
//! # Example
//!
//! ```rust,no_run
//! use documind_rag::{DocuMindConfig, Pipeline, RawFile};
//!
//! # async fn run() -> documind_rag::Result<()> {
//! let config = DocuMindConfig::from_env()?;
//! let pipeline = Pipeline::from_config(config).await?;
//!
//! let report = pipeline
//!     .ingest_all(&[RawFile::new("notes.md", std::fs::read("notes.md").unwrap())])
//!     .await;
//! println!("indexed {} file(s)", report.processed_count());
//!
//! let result = pipeline.query("What do my notes say about Rust?", 3).await?;
//! println!("{}", result.answer);
//! # Ok(())
//! # }
//! ```

/// Token-aware document chunking.
pub mod chunking;

/// Pipeline configuration with validated defaults.
pub mod config;

/// Data types for documents, chunks, records, and results.
pub mod document;

/// Embedding provider trait.
pub mod embedding;

/// Error types for all library operations.
pub mod error;

/// Text extraction from raw file bytes.
pub mod extract;

/// Answer generator trait.
pub mod generation;

/// The vector index and its five-operation contract.
pub mod index;

/// In-memory vector store backend for development and tests.
pub mod inmemory;

/// OpenAI embedding and chat providers.
pub mod openai;

/// Pipeline orchestration: ingest and query composition.
pub mod pipeline;

/// Prompt templates for answer generation.
pub mod prompts;

/// Qdrant vector store backend.
pub mod qdrant;

/// Vector store backend trait.
pub mod vectorstore;

pub use chunking::{HfTokenizer, TokenChunker, Tokenizer};
pub use config::{DocuMindConfig, DocuMindConfigBuilder};
pub use document::{
    Chunk, ChunkMetadata, Document, FileOutcome, FileType, IndexStats, IndexedRecord,
    IngestReport, QueryAnswer, ScoredChunk, SourceRef,
};
pub use embedding::EmbeddingProvider;
pub use error::{DocuMindError, Result};
pub use generation::AnswerGenerator;
pub use index::DocumentIndex;
pub use inmemory::InMemoryStore;
pub use openai::{OpenAIChat, OpenAIEmbedding};
pub use pipeline::{
    GENERATION_FALLBACK_ANSWER, NO_RELEVANT_INFO_ANSWER, Pipeline, RawFile,
};
pub use qdrant::QdrantStore;
pub use vectorstore::VectorStore;
