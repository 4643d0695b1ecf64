//! Data types for documents, chunks, indexed records, and query results.

use serde::{Deserialize, Serialize};

/// The file types the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A PDF file, extracted page by page.
    Pdf,
    /// A plain text file, read verbatim.
    Txt,
    /// A markdown file, read verbatim.
    Md,
}

impl FileType {
    /// Map a file extension (without the dot, case-insensitive) to a
    /// [`FileType`]. Returns `None` for unsupported extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Md),
            _ => None,
        }
    }
}

/// A named, typed unit of ingested input.
///
/// Transient: exists only during ingestion and is never persisted itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Source filename, unique within a run. Used as source identity.
    pub filename: String,
    /// The full extracted text.
    pub content: String,
    /// The detected file type.
    pub file_type: FileType,
}

/// Metadata carried by every indexed chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Filename of the source document.
    pub source_file: String,
    /// 0-based position of this chunk within its document.
    pub chunk_index: usize,
    /// Number of chunks produced from the same document in the same
    /// ingestion run.
    pub total_chunks: usize,
}

/// A bounded span of a document's token stream.
///
/// Chunk identity is the pair (`source_file`, `chunk_index`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The decoded token span.
    pub text: String,
    /// Source and position metadata.
    pub metadata: ChunkMetadata,
}

/// The persisted unit of the vector index.
///
/// Owned exclusively by the index once inserted; survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedRecord {
    /// Deterministic id, `{source_file}_{chunk_index}`.
    pub id: String,
    /// The embedding vector for `text`.
    pub embedding: Vec<f32>,
    /// The chunk text.
    pub text: String,
    /// Source and position metadata.
    pub metadata: ChunkMetadata,
}

/// A retrieved chunk paired with its cosine distance to the query.
///
/// Lower distance means more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The chunk text.
    pub text: String,
    /// Source and position metadata.
    pub metadata: ChunkMetadata,
    /// Cosine distance between the query embedding and this chunk.
    pub distance: f32,
}

/// Aggregate statistics over the vector index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    /// Total number of indexed chunks.
    pub total_chunks: usize,
    /// Number of distinct source files.
    pub unique_documents: usize,
    /// Sorted list of distinct source filenames.
    pub source_files: Vec<String>,
}

/// A chunk that grounded an answer, as reported back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// The chunk text that was supplied as context.
    pub text: String,
    /// Filename of the source document.
    pub source_file: String,
    /// 0-based chunk position within its document.
    pub chunk_index: usize,
}

/// The structured result of a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryAnswer {
    /// The original query text.
    pub query: String,
    /// The generated (or fixed fallback) answer.
    pub answer: String,
    /// The retrieved chunks used as context, nearest first.
    pub sources: Vec<SourceRef>,
    /// Number of chunks supplied to the answer generator.
    pub chunks_used: usize,
}

/// The outcome of ingesting a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileOutcome {
    /// The ingested filename.
    pub filename: String,
    /// Number of chunks added to the index. Zero for empty or
    /// too-short content, which is a success, not an error.
    pub chunks_added: usize,
}

/// A summary of a multi-file ingestion run.
///
/// Always produced, even under partial failure: one file's error never
/// aborts processing of the remaining files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    /// Files that were processed successfully.
    pub processed: Vec<FileOutcome>,
    /// Total number of files submitted.
    pub total: usize,
    /// Per-file error strings, `{filename}: {error}`.
    pub errors: Vec<String>,
}

impl IngestReport {
    /// Number of files processed successfully.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
