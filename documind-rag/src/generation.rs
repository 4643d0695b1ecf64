//! Answer generator trait for producing grounded answers.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates a grounded natural-language answer from a
/// query and retrieved context chunks.
///
/// `context_chunks` are expected nearest-first; implementations join them
/// in the order received. A single remote call is issued per answer.
/// Failures surface as [`DocuMindError::Generation`](crate::DocuMindError::Generation)
/// and the pipeline converts them into a fixed fallback answer, so a
/// failed generation degrades the request instead of aborting it.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer to `query` using only the supplied context.
    ///
    /// Returns the trimmed text of the model's single top response.
    async fn generate(
        &self,
        query: &str,
        context_chunks: &[String],
        max_tokens: u32,
    ) -> Result<String>;
}
