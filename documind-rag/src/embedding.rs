//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific remote embedding backend behind a
/// unified async interface. [`embed_batch`](EmbeddingProvider::embed_batch)
/// issues exactly one remote call and must return one vector per input,
/// in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of texts with one remote call.
    ///
    /// The returned vectors are in the same order as `texts`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Embed a list of texts in consecutive batches of at most
    /// `batch_size` elements (the last batch may be smaller), issuing
    /// `ceil(texts.len() / batch_size)` remote calls.
    ///
    /// Output order matches input order. If any batch fails the whole
    /// operation aborts immediately and the error propagates: partially
    /// embedded output must never reach the index, since chunk/embedding
    /// pairing downstream would become misaligned.
    async fn embed_all(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        debug_assert!(batch_size >= 1);

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for (batch_number, batch) in texts.chunks(batch_size.max(1)).enumerate() {
            let embeddings = self.embed_batch(batch).await?;
            debug!(batch_number, batch_len = batch.len(), "embedded batch");
            all_embeddings.extend(embeddings);
        }
        Ok(all_embeddings)
    }
}
