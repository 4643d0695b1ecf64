//! Token-aware document chunking.
//!
//! Text is split into overlapping fixed-size token windows. Boundaries
//! are by token count, not sentence or paragraph structure, so splitting
//! behaves uniformly across file types but can land mid-sentence.

use std::path::Path;
use std::sync::Arc;

use crate::document::{Chunk, ChunkMetadata, Document};
use crate::error::{DocuMindError, Result};

/// An encode/decode seam over a concrete tokenizer.
///
/// Token counts must reflect what the downstream generation model will
/// actually consume, so production code uses [`HfTokenizer`] loaded from
/// that model family's tokenizer file. Tests substitute deterministic
/// implementations.
pub trait Tokenizer: Send + Sync {
    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode token ids back into text.
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// A [`Tokenizer`] backed by a HuggingFace `tokenizer.json` file.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Tokenizer`] if the file cannot be read
    /// or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path.as_ref())
            .map_err(|e| DocuMindError::Tokenizer(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| DocuMindError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner.decode(ids, true).map_err(|e| DocuMindError::Tokenizer(e.to_string()))
    }
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer").finish_non_exhaustive()
    }
}

/// Splits text into overlapping fixed-size token windows.
///
/// Each window holds at most `chunk_size` tokens and consecutive windows
/// overlap by `chunk_overlap` tokens, so the window start advances by
/// `chunk_size - chunk_overlap` per step. The overlap must be strictly
/// smaller than the chunk size or the window would never advance; this is
/// validated at construction time.
#[derive(Clone)]
pub struct TokenChunker {
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TokenChunker {
    /// Create a new `TokenChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocuMindError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocuMindError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { tokenizer, chunk_size, chunk_overlap })
    }

    /// Split text into overlapping token-window chunks.
    ///
    /// Returns an empty `Vec` for text that tokenizes to nothing. Text
    /// that fits within a single window is returned verbatim without a
    /// decode round-trip, avoiding token-boundary artifacts.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.encode(text)?;
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        if tokens.len() <= self.chunk_size {
            return Ok(vec![text.to_string()]);
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(tokens.len());
            chunks.push(self.tokenizer.decode(&tokens[start..end])?);
            if end == tokens.len() {
                break;
            }
            start += step;
        }
        Ok(chunks)
    }

    /// Chunk a document, attaching contiguous 0-based chunk indices and
    /// the run's total chunk count to each chunk's metadata.
    pub fn chunk_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        let texts = self.chunk(&document.content)?;
        let total_chunks = texts.len();
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                text,
                metadata: ChunkMetadata {
                    source_file: document.filename.clone(),
                    chunk_index,
                    total_chunks,
                },
            })
            .collect())
    }
}

impl std::fmt::Debug for TokenChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenChunker")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish_non_exhaustive()
    }
}
