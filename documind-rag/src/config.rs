//! Configuration for the DocuMind pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DocuMindError, Result};

/// Configuration parameters for the DocuMind pipeline.
///
/// Construct via [`DocuMindConfig::builder()`] or [`DocuMindConfig::from_env()`];
/// both validate the parameters before the pipeline starts, so an invalid
/// chunking setup (e.g. `chunk_overlap >= chunk_size`, which would keep the
/// chunk window from ever advancing) is rejected at startup rather than
/// discovered mid-ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocuMindConfig {
    /// Name of the remote embedding model.
    pub embedding_model: String,
    /// Dimensionality of the embedding vectors.
    pub embedding_dimensions: usize,
    /// Name of the remote chat model used for answer generation.
    pub generation_model: String,
    /// Maximum chunk size in tokens.
    pub chunk_size: usize,
    /// Number of overlapping tokens between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunk texts sent per embedding API call.
    pub embed_batch_size: usize,
    /// Maximum number of tokens in a generated answer.
    pub max_answer_tokens: u32,
    /// URL of the Qdrant instance that persists the vector index.
    pub qdrant_url: String,
    /// Name of the vector index collection.
    pub collection_name: String,
    /// Path to the `tokenizer.json` file used for token-aware chunking.
    ///
    /// Should belong to the same tokenizer family as the generation model
    /// so token counts reflect what that model will actually consume.
    pub tokenizer_path: PathBuf,
    /// Folder scanned by directory ingestion.
    pub documents_dir: PathBuf,
}

impl Default for DocuMindConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            generation_model: "gpt-4o-mini".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
            embed_batch_size: 100,
            max_answer_tokens: 500,
            qdrant_url: "http://localhost:6334".to_string(),
            collection_name: "documind_collection".to_string(),
            tokenizer_path: PathBuf::from("./tokenizer.json"),
            documents_dir: PathBuf::from("./data/documents"),
        }
    }
}

impl DocuMindConfig {
    /// Create a new builder for constructing a [`DocuMindConfig`].
    pub fn builder() -> DocuMindConfigBuilder {
        DocuMindConfigBuilder::default()
    }

    /// Load configuration from `DOCUMIND_*` environment variables.
    ///
    /// Unset variables fall back to the documented defaults. Recognized
    /// variables: `DOCUMIND_EMBEDDING_MODEL`, `DOCUMIND_EMBEDDING_DIMENSIONS`,
    /// `DOCUMIND_GENERATION_MODEL`, `DOCUMIND_CHUNK_SIZE`,
    /// `DOCUMIND_CHUNK_OVERLAP`, `DOCUMIND_EMBED_BATCH_SIZE`,
    /// `DOCUMIND_MAX_ANSWER_TOKENS`, `DOCUMIND_QDRANT_URL`,
    /// `DOCUMIND_COLLECTION_NAME`, `DOCUMIND_TOKENIZER_PATH`,
    /// `DOCUMIND_DOCUMENTS_DIR`.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Config`] if a variable fails to parse or
    /// the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Self::builder();
        if let Some(v) = env_string("DOCUMIND_EMBEDDING_MODEL") {
            builder = builder.embedding_model(v);
        }
        builder = builder.embedding_dimensions(env_parsed(
            "DOCUMIND_EMBEDDING_DIMENSIONS",
            defaults.embedding_dimensions,
        )?);
        if let Some(v) = env_string("DOCUMIND_GENERATION_MODEL") {
            builder = builder.generation_model(v);
        }
        builder = builder
            .chunk_size(env_parsed("DOCUMIND_CHUNK_SIZE", defaults.chunk_size)?)
            .chunk_overlap(env_parsed("DOCUMIND_CHUNK_OVERLAP", defaults.chunk_overlap)?)
            .embed_batch_size(env_parsed("DOCUMIND_EMBED_BATCH_SIZE", defaults.embed_batch_size)?)
            .max_answer_tokens(env_parsed(
                "DOCUMIND_MAX_ANSWER_TOKENS",
                defaults.max_answer_tokens,
            )?);
        if let Some(v) = env_string("DOCUMIND_QDRANT_URL") {
            builder = builder.qdrant_url(v);
        }
        if let Some(v) = env_string("DOCUMIND_COLLECTION_NAME") {
            builder = builder.collection_name(v);
        }
        if let Some(v) = env_string("DOCUMIND_TOKENIZER_PATH") {
            builder = builder.tokenizer_path(v);
        }
        if let Some(v) = env_string("DOCUMIND_DOCUMENTS_DIR") {
            builder = builder.documents_dir(v);
        }

        builder.build()
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env_string(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| DocuMindError::Config(format!("{key} has invalid value '{raw}'"))),
        None => Ok(default),
    }
}

/// Builder for constructing a validated [`DocuMindConfig`].
#[derive(Debug, Clone, Default)]
pub struct DocuMindConfigBuilder {
    config: DocuMindConfig,
}

impl DocuMindConfigBuilder {
    /// Set the embedding model name.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn embedding_dimensions(mut self, dims: usize) -> Self {
        self.config.embedding_dimensions = dims;
        self
    }

    /// Set the chat model used for answer generation.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Set the maximum chunk size in tokens.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in tokens.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of texts sent per embedding API call.
    pub fn embed_batch_size(mut self, batch_size: usize) -> Self {
        self.config.embed_batch_size = batch_size;
        self
    }

    /// Set the maximum number of tokens in a generated answer.
    pub fn max_answer_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_answer_tokens = max_tokens;
        self
    }

    /// Set the Qdrant instance URL.
    pub fn qdrant_url(mut self, url: impl Into<String>) -> Self {
        self.config.qdrant_url = url.into();
        self
    }

    /// Set the vector index collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the path to the tokenizer file.
    pub fn tokenizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tokenizer_path = path.into();
        self
    }

    /// Set the documents folder for directory ingestion.
    pub fn documents_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.documents_dir = path.into();
        self
    }

    /// Build the [`DocuMindConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `embed_batch_size == 0`
    /// - `embedding_dimensions == 0`
    pub fn build(self) -> Result<DocuMindConfig> {
        if self.config.chunk_size == 0 {
            return Err(DocuMindError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(DocuMindError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.embed_batch_size == 0 {
            return Err(DocuMindError::Config(
                "embed_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.config.embedding_dimensions == 0 {
            return Err(DocuMindError::Config(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
