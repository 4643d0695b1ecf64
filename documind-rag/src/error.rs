//! Error types for the `documind-rag` crate.

use thiserror::Error;

/// Errors that can occur in the DocuMind pipeline.
#[derive(Debug, Error)]
pub enum DocuMindError {
    /// A file could not be read or parsed during text extraction.
    ///
    /// Recovered per file by the pipeline; never aborts a batch.
    #[error("Extraction error ({file}): {message}")]
    Extraction {
        /// The file that failed to extract.
        file: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote embedding call failed.
    ///
    /// Aborts the current document's ingest so that no partially
    /// embedded output reaches the index.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A storage failure on insert. Propagated as a hard failure.
    #[error("Index write error ({backend}): {message}")]
    IndexWrite {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A storage failure on a read/maintenance path (query, stats,
    /// delete, clear). Callers degrade these to empty/false results.
    #[error("Index read error ({backend}): {message}")]
    IndexRead {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A remote chat generation call failed.
    ///
    /// The pipeline converts this into a fixed fallback answer.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding's length does not match the index's configured
    /// dimensionality. Rejected, never silently truncated.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality the index was configured with.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// A file extension the pipeline does not handle.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// An empty or whitespace-only query, rejected before retrieval.
    #[error("Query text must not be empty")]
    EmptyQuery,

    /// A tokenizer failed to encode or decode text.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

/// A convenience result type for DocuMind operations.
pub type Result<T> = std::result::Result<T, DocuMindError>;
