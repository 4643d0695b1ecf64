//! Text extraction from raw file bytes.
//!
//! PDFs are read page by page; pages that fail extraction or contain only
//! whitespace are dropped, and every retained page is prefixed with a
//! 1-based `[Page N]` marker. Plain text and markdown are decoded verbatim.

use lopdf::Document as PdfDocument;
use tracing::debug;

use crate::document::FileType;
use crate::error::{DocuMindError, Result};

/// Extract a single text string from raw file bytes.
///
/// # Errors
///
/// Returns [`DocuMindError::Extraction`] if the file cannot be parsed
/// (corrupt PDF, non-UTF-8 text). Individual unextractable PDF pages are
/// skipped silently, not errors.
pub fn extract_text(filename: &str, bytes: &[u8], file_type: FileType) -> Result<String> {
    match file_type {
        FileType::Pdf => extract_pdf_text(filename, bytes),
        FileType::Txt | FileType::Md => {
            String::from_utf8(bytes.to_vec()).map_err(|e| DocuMindError::Extraction {
                file: filename.to_string(),
                message: format!("invalid UTF-8: {e}"),
            })
        }
    }
}

/// Extract text from every page of a PDF, joining retained pages with a
/// blank line.
fn extract_pdf_text(filename: &str, bytes: &[u8]) -> Result<String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| DocuMindError::Extraction {
        file: filename.to_string(),
        message: format!("failed to parse PDF: {e}"),
    })?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    // Pages that fail extraction yield an empty string and are filtered
    // out together with whitespace-only pages.
    let pages = page_numbers.iter().enumerate().map(|(idx, page_number)| {
        let text = doc.extract_text(&[*page_number]).unwrap_or_default();
        (idx + 1, text)
    });

    let text = assemble_pages(pages);
    debug!(file = filename, pages = page_numbers.len(), chars = text.len(), "extracted PDF");
    Ok(text)
}

/// Join 1-based `(page_number, text)` pairs into a single string, dropping
/// blank pages and prefixing the rest with `[Page N]` markers.
fn assemble_pages(pages: impl Iterator<Item = (usize, String)>) -> String {
    pages
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(page_number, text)| format!("[Page {page_number}]\n{text}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
