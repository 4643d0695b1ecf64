//! Unit and property tests for the token-window chunker.

use std::sync::Arc;

use documind_rag::chunking::{TokenChunker, Tokenizer};
use documind_rag::document::{Document, FileType};
use documind_rag::error::DocuMindError;
use proptest::prelude::*;

/// A deterministic tokenizer where every character is one token.
///
/// Encode and decode are exact inverses, so window math can be checked
/// directly against character offsets.
struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> documind_rag::Result<Vec<u32>> {
        Ok(text.chars().map(|c| c as u32).collect())
    }

    fn decode(&self, ids: &[u32]) -> documind_rag::Result<String> {
        Ok(ids.iter().filter_map(|&id| char::from_u32(id)).collect())
    }
}

fn chunker(chunk_size: usize, overlap: usize) -> TokenChunker {
    TokenChunker::new(Arc::new(CharTokenizer), chunk_size, overlap).unwrap()
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunker(10, 2).chunk("").unwrap().is_empty());
}

#[test]
fn short_text_is_returned_verbatim_as_single_chunk() {
    let text = "short enough";
    let chunks = chunker(100, 10).chunk(text).unwrap();
    assert_eq!(chunks, vec![text.to_string()]);
}

#[test]
fn text_exactly_at_chunk_size_is_a_single_chunk() {
    let text = "x".repeat(10);
    let chunks = chunker(10, 2).chunk(&text).unwrap();
    assert_eq!(chunks, vec![text]);
}

#[test]
fn overlap_equal_to_chunk_size_is_rejected_at_construction() {
    let err = TokenChunker::new(Arc::new(CharTokenizer), 10, 10).unwrap_err();
    assert!(matches!(err, DocuMindError::Config(_)));
}

#[test]
fn overlap_greater_than_chunk_size_is_rejected_at_construction() {
    let err = TokenChunker::new(Arc::new(CharTokenizer), 10, 15).unwrap_err();
    assert!(matches!(err, DocuMindError::Config(_)));
}

#[test]
fn zero_chunk_size_is_rejected_at_construction() {
    let err = TokenChunker::new(Arc::new(CharTokenizer), 0, 0).unwrap_err();
    assert!(matches!(err, DocuMindError::Config(_)));
}

#[test]
fn twelve_hundred_tokens_with_default_settings_make_three_chunks() {
    // 1200 tokens, windows of 500 advancing by 450: [0,500) [450,950) [900,1200)
    let text: String = "abcdefghij".repeat(120);
    let chunks = chunker(500, 50).chunk(&text).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].chars().count(), 500);
    assert_eq!(chunks[1].chars().count(), 500);
    assert_eq!(chunks[2].chars().count(), 300);
}

#[test]
fn chunk_document_assigns_contiguous_indices_and_totals() {
    let document = Document {
        filename: "notes.md".to_string(),
        content: "abcdefghij".repeat(120),
        file_type: FileType::Md,
    };
    let chunks = chunker(500, 50).chunk_document(&document).unwrap();

    assert_eq!(chunks.len(), 3);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_index, i);
        assert_eq!(chunk.metadata.total_chunks, 3);
        assert_eq!(chunk.metadata.source_file, "notes.md");
    }
}

proptest! {
    /// Any non-empty text at most `chunk_size` tokens long comes back as
    /// exactly one chunk equal to the input.
    #[test]
    fn short_inputs_are_never_split(
        text in "[a-z ]{1,80}",
        overlap in 0usize..80,
    ) {
        let chunks = chunker(80, overlap.min(79)).chunk(&text).unwrap();
        prop_assert_eq!(chunks, vec![text]);
    }

    /// For longer inputs the windows advance by `chunk_size - overlap`,
    /// every window except the last holds exactly `chunk_size` tokens,
    /// and the last window ends exactly at the end of the token stream.
    #[test]
    fn windows_advance_by_step_and_cover_the_text(
        text in "[a-zA-Z0-9 ]{81,400}",
        chunk_size in 20usize..80,
        overlap in 0usize..19,
    ) {
        let total: usize = text.chars().count();
        prop_assume!(total > chunk_size);

        let step = chunk_size - overlap;
        let chunks = chunker(chunk_size, overlap).chunk(&text).unwrap();

        // Expected chunk count for the clamped-window algorithm.
        let expected = 1 + (total - chunk_size).div_ceil(step);
        prop_assert_eq!(chunks.len(), expected);

        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * step;
            let len = chunk.chars().count();
            if i + 1 < chunks.len() {
                prop_assert_eq!(len, chunk_size);
            } else {
                // Last window is clamped to the end of the stream.
                prop_assert_eq!(start + len, total);
            }
        }
    }

    /// Dropping the leading `overlap` tokens of every chunk after the
    /// first reconstructs the original text: nothing is lost or
    /// duplicated outside the intended overlap.
    #[test]
    fn deduplicated_chunks_reconstruct_the_original(
        text in "[a-zA-Z0-9 ]{81,400}",
        chunk_size in 20usize..80,
        overlap in 0usize..19,
    ) {
        prop_assume!(text.chars().count() > chunk_size);

        let chunks = chunker(chunk_size, overlap).chunk(&text).unwrap();

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(overlap));
        }
        prop_assert_eq!(rebuilt, text);
    }
}
