//! OpenAI-backed embedding and answer generation providers.
//!
//! Both providers call the OpenAI REST API directly with `reqwest`:
//! [`OpenAIEmbedding`] against `/v1/embeddings` and [`OpenAIChat`]
//! against `/v1/chat/completions`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{DocuMindError, Result};
use crate::generation::AnswerGenerator;
use crate::prompts;

/// The OpenAI embeddings API endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The OpenAI chat completions API endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Sampling temperature for answer generation.
const CHAT_TEMPERATURE: f32 = 0.7;

/// Frequency penalty for answer generation, reduces repetition.
const CHAT_FREQUENCY_PENALTY: f32 = 0.3;

fn api_key_from_env(kind: &'static str) -> Result<String> {
    std::env::var("OPENAI_API_KEY").map_err(|_| match kind {
        "embedding" => DocuMindError::Embedding {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        },
        _ => DocuMindError::Generation {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        },
    })
}

/// Decode an OpenAI error body into its message, falling back to the raw body.
fn error_detail(body: String) -> String {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// The configured `dimensions` value is sent with every request so the
/// API returns vectors of exactly that length (Matryoshka truncation),
/// keeping provider output aligned with the index's configured
/// dimensionality.
pub struct OpenAIEmbedding {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedding {
    /// Create a new provider.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Embedding`] if the API key is empty.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(DocuMindError::Embedding {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: model.into(), dimensions })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>, dimensions: usize) -> Result<Self> {
        Self::new(api_key_from_env("embedding")?, model, dimensions)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                DocuMindError::Embedding {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(DocuMindError::Embedding {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embeddings response");
            DocuMindError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(DocuMindError::Embedding {
                provider: "OpenAI".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embedding_response.data.len(),
                    texts.len()
                ),
            });
        }

        // The API returns per-input vectors in submission order; keep it.
        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| DocuMindError::Embedding {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// An [`AnswerGenerator`] backed by the OpenAI chat completions API.
pub struct OpenAIChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAIChat {
    /// Create a new generator.
    ///
    /// # Errors
    ///
    /// Returns [`DocuMindError::Generation`] if the API key is empty.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(DocuMindError::Generation {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: model.into() })
    }

    /// Create a new generator using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        Self::new(api_key_from_env("generation")?, model)
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AnswerGenerator for OpenAIChat {
    async fn generate(
        &self,
        query: &str,
        context_chunks: &[String],
        max_tokens: u32,
    ) -> Result<String> {
        let user_prompt = prompts::build_user_prompt(context_chunks, query);

        debug!(
            provider = "OpenAI",
            model = %self.model,
            context_chunks = context_chunks.len(),
            "generating answer"
        );

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: prompts::SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            max_tokens,
            temperature: CHAT_TEMPERATURE,
            frequency_penalty: CHAT_FREQUENCY_PENALTY,
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "chat request failed");
                DocuMindError::Generation {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "OpenAI", %status, "chat API error");
            return Err(DocuMindError::Generation {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            DocuMindError::Generation {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let answer = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DocuMindError::Generation {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            })?;

        Ok(answer.trim().to_string())
    }
}
