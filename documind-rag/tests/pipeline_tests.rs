//! End-to-end scenario tests for the ingest and query pipeline, run
//! against the in-memory store with local embedding/generation doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use documind_rag::chunking::Tokenizer;
use documind_rag::config::DocuMindConfig;
use documind_rag::embedding::EmbeddingProvider;
use documind_rag::error::DocuMindError;
use documind_rag::generation::AnswerGenerator;
use documind_rag::inmemory::InMemoryStore;
use documind_rag::pipeline::{
    GENERATION_FALLBACK_ANSWER, NO_RELEVANT_INFO_ANSWER, Pipeline, RawFile,
};

const DIM: usize = 8;

/// A deterministic tokenizer where every character is one token.
struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> documind_rag::Result<Vec<u32>> {
        Ok(text.chars().map(|c| c as u32).collect())
    }

    fn decode(&self, ids: &[u32]) -> documind_rag::Result<String> {
        Ok(ids.iter().filter_map(|&id| char::from_u32(id)).collect())
    }
}

fn fake_embedding(text: &str, dim: usize) -> Vec<f32> {
    let seed: u32 = text.bytes().map(u32::from).sum();
    (0..dim).map(|i| ((seed + i as u32) % 13) as f32 + 1.0).collect()
}

/// A deterministic embedder that counts batch calls and can be set to
/// fail on a specific call number.
struct StubEmbedder {
    dims: usize,
    batch_calls: Arc<AtomicUsize>,
    fail_on_call: Option<usize>,
}

impl StubEmbedder {
    fn new(dims: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { dims, batch_calls: Arc::clone(&calls), fail_on_call: None }, calls)
    }

    fn failing_on(dims: usize, call: usize) -> Self {
        Self { dims, batch_calls: Arc::new(AtomicUsize::new(0)), fail_on_call: Some(call) }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> documind_rag::Result<Vec<Vec<f32>>> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(DocuMindError::Embedding {
                provider: "stub".to_string(),
                message: "simulated remote failure".to_string(),
            });
        }
        Ok(texts.iter().map(|t| fake_embedding(t, self.dims)).collect())
    }

    async fn embed(&self, text: &str) -> documind_rag::Result<Vec<f32>> {
        Ok(fake_embedding(text, self.dims))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// A generator that counts calls and either answers or fails.
struct StubGenerator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl StubGenerator {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { calls: Arc::clone(&calls), fail: false }, calls)
    }

    fn failing() -> Self {
        Self { calls: Arc::new(AtomicUsize::new(0)), fail: true }
    }
}

#[async_trait]
impl AnswerGenerator for StubGenerator {
    async fn generate(
        &self,
        query: &str,
        _context_chunks: &[String],
        _max_tokens: u32,
    ) -> documind_rag::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DocuMindError::Generation {
                provider: "stub".to_string(),
                message: "simulated remote failure".to_string(),
            });
        }
        Ok(format!("grounded answer to: {query}"))
    }
}

fn test_config() -> DocuMindConfig {
    DocuMindConfig::builder()
        .embedding_dimensions(DIM)
        .collection_name("test")
        .build()
        .unwrap()
}

async fn pipeline_with(
    config: DocuMindConfig,
    embedder: StubEmbedder,
    generator: StubGenerator,
) -> Pipeline {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Pipeline::new(
        config,
        Arc::new(CharTokenizer),
        Arc::new(embedder),
        Arc::new(InMemoryStore::new()),
        Arc::new(generator),
    )
    .await
    .unwrap()
}

/// 1200-token content with chunk_size 500 and overlap 50.
fn long_file(filename: &str) -> RawFile {
    RawFile::new(filename, "abcdefghij".repeat(120).into_bytes())
}

#[tokio::test]
async fn ingesting_a_long_file_indexes_three_chunks() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let outcome = pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    assert_eq!(outcome.filename, "notes.md");
    assert_eq!(outcome.chunks_added, 3);

    let stats = pipeline.index().stats().await;
    assert_eq!(stats.total_chunks, 3);
    assert_eq!(stats.unique_documents, 1);
    assert_eq!(stats.source_files, vec!["notes.md".to_string()]);
}

#[tokio::test]
async fn ingest_batches_chunks_into_ceil_k_over_b_embedding_calls() {
    let config = DocuMindConfig::builder()
        .embedding_dimensions(DIM)
        .collection_name("test")
        .embed_batch_size(2)
        .build()
        .unwrap();
    let (embedder, batch_calls) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(config, embedder, generator).await;

    // 3 chunks with batch size 2: two embedding calls.
    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    assert_eq!(batch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn embed_all_issues_one_call_per_batch_and_preserves_order() {
    let (embedder, batch_calls) = StubEmbedder::new(DIM);
    let texts = ["a", "b", "c", "d", "e", "f", "g"];

    let embeddings = embedder.embed_all(&texts, 3).await.unwrap();

    assert_eq!(batch_calls.load(Ordering::SeqCst), 3);
    assert_eq!(embeddings.len(), texts.len());
    for (text, embedding) in texts.iter().zip(&embeddings) {
        assert_eq!(embedding, &fake_embedding(text, DIM));
    }
}

#[tokio::test]
async fn embed_all_of_nothing_makes_no_remote_calls() {
    let (embedder, batch_calls) = StubEmbedder::new(DIM);
    let embeddings = embedder.embed_all(&[], 3).await.unwrap();
    assert!(embeddings.is_empty());
    assert_eq!(batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_failing_batch_aborts_ingest_with_nothing_indexed() {
    let config = DocuMindConfig::builder()
        .embedding_dimensions(DIM)
        .collection_name("test")
        .embed_batch_size(2)
        .build()
        .unwrap();
    // Second embedding call fails, after the first batch succeeded.
    let embedder = StubEmbedder::failing_on(DIM, 1);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(config, embedder, generator).await;

    let err = pipeline.ingest_file(&long_file("notes.md")).await.unwrap_err();
    assert!(matches!(err, DocuMindError::Embedding { .. }));
    assert_eq!(pipeline.index().stats().await.total_chunks, 0);
}

#[tokio::test]
async fn unsupported_extension_is_rejected_before_extraction() {
    let (embedder, batch_calls) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let file = RawFile::new("image.png", vec![0u8; 16]);
    let err = pipeline.ingest_file(&file).await.unwrap_err();
    assert!(matches!(err, DocuMindError::UnsupportedFileType(name) if name == "image.png"));
    assert_eq!(batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_content_succeeds_with_zero_chunks_and_no_embedding_calls() {
    let (embedder, batch_calls) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let outcome = pipeline.ingest_file(&RawFile::new("empty.txt", Vec::new())).await.unwrap();
    assert_eq!(outcome.chunks_added, 0);
    assert_eq!(batch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.index().stats().await.total_chunks, 0);
}

#[tokio::test]
async fn ingest_all_collects_per_file_errors_without_aborting() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let files = [long_file("notes.md"), RawFile::new("image.png", vec![0u8; 16])];
    let report = pipeline.ingest_all(&files).await;

    assert_eq!(report.total, 2);
    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.processed[0].filename, "notes.md");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("image.png: "));
}

#[tokio::test]
async fn reingesting_a_shrunk_file_leaves_no_stale_chunks() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    assert_eq!(pipeline.index().stats().await.total_chunks, 3);

    // Same filename, now short enough for a single chunk.
    let outcome = pipeline
        .ingest_file(&RawFile::new("notes.md", b"much shorter now".to_vec()))
        .await
        .unwrap();
    assert_eq!(outcome.chunks_added, 1);

    let stats = pipeline.index().stats().await;
    assert_eq!(stats.total_chunks, 1);
    assert_eq!(stats.source_files, vec!["notes.md".to_string()]);
}

#[tokio::test]
async fn reingesting_to_empty_content_removes_previous_chunks() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    assert_eq!(pipeline.index().stats().await.total_chunks, 3);

    // Same filename, now empty: the previous records must not survive.
    let outcome = pipeline.ingest_file(&RawFile::new("notes.md", Vec::new())).await.unwrap();
    assert_eq!(outcome.chunks_added, 0);

    let stats = pipeline.index().stats().await;
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.unique_documents, 0);
    assert!(stats.source_files.is_empty());
}

#[tokio::test]
async fn query_returns_grounded_answer_with_sources() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, generator_calls) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    let result = pipeline.query("what do my notes say?", 2).await.unwrap();

    assert_eq!(result.query, "what do my notes say?");
    assert_eq!(result.answer, "grounded answer to: what do my notes say?");
    assert_eq!(result.chunks_used, 2);
    assert_eq!(result.sources.len(), 2);
    assert!(result.sources.iter().all(|s| s.source_file == "notes.md"));
    assert_eq!(generator_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn query_on_empty_index_skips_generation_and_returns_fixed_answer() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, generator_calls) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let result = pipeline.query("anything in there?", 3).await.unwrap();

    assert_eq!(result.answer, NO_RELEVANT_INFO_ANSWER);
    assert_eq!(result.chunks_used, 0);
    assert!(result.sources.is_empty());
    assert_eq!(generator_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_query_is_rejected_before_retrieval() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    let err = pipeline.query("   ", 3).await.unwrap_err();
    assert!(matches!(err, DocuMindError::EmptyQuery));
}

#[tokio::test]
async fn generation_failure_degrades_to_fallback_answer() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let pipeline = pipeline_with(test_config(), embedder, StubGenerator::failing()).await;

    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    let result = pipeline.query("what do my notes say?", 2).await.unwrap();

    // The request still succeeds with sources attached.
    assert_eq!(result.answer, GENERATION_FALLBACK_ANSWER);
    assert_eq!(result.chunks_used, 2);
    assert_eq!(result.sources.len(), 2);
}

#[tokio::test]
async fn clearing_the_index_resets_stats_to_zero() {
    let (embedder, _) = StubEmbedder::new(DIM);
    let (generator, _) = StubGenerator::new();
    let pipeline = pipeline_with(test_config(), embedder, generator).await;

    pipeline.ingest_file(&long_file("notes.md")).await.unwrap();
    assert!(pipeline.index().clear().await);

    let stats = pipeline.index().stats().await;
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.unique_documents, 0);
    assert!(stats.source_files.is_empty());
}
