//! # concord-extract
//!
//! Paragraph extraction from Word (`.docx`) documents.
//!
//! This crate provides:
//! - A zip + XML reader producing a block tree (paragraphs, headings, list
//!   items, tables)
//! - HTML and plain-text renderers over that tree
//! - The positional text/markup pairing heuristic
//! - [`DocxParagraphExtractor`], the `ParagraphExtractor` implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use concord_core::ParagraphExtractor;
//! use concord_extract::DocxParagraphExtractor;
//!
//! let bytes = std::fs::read("contract.docx").unwrap();
//! let paragraphs = DocxParagraphExtractor::new().extract(&bytes).unwrap();
//! for p in paragraphs {
//!     println!("{} {}", p.paragraph_id, p.text);
//! }
//! ```

pub mod docx;
pub mod paragraphs;
pub mod render;

use tracing::debug;

use concord_core::defaults::{ACCEPTED_EXTENSION, MAX_DOCX_PART_BYTES};
use concord_core::{Error, ExtractedParagraph, ParagraphExtractor, Result};

pub use docx::{Block, Inline, ParagraphKind};

/// Extracts addressable paragraphs from `.docx` bytes.
///
/// Stateless; identical bytes always yield identical paragraphs.
#[derive(Debug, Clone, Copy)]
pub struct DocxParagraphExtractor {
    max_part_bytes: u64,
}

impl Default for DocxParagraphExtractor {
    fn default() -> Self {
        Self {
            max_part_bytes: MAX_DOCX_PART_BYTES,
        }
    }
}

impl DocxParagraphExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on the inflated size of each XML part read from the package.
    pub fn with_max_part_bytes(mut self, max_part_bytes: u64) -> Self {
        self.max_part_bytes = max_part_bytes;
        self
    }
}

impl ParagraphExtractor for DocxParagraphExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<ExtractedParagraph>> {
        let blocks = docx::read_blocks_with_limit(bytes, self.max_part_bytes)?;
        let html = render::to_html(&blocks);
        let text = render::to_text(&blocks);

        let texts = paragraphs::split_text_paragraphs(&text);
        let fragments = paragraphs::extract_markup_fragments(&html);
        let extracted = paragraphs::pair_paragraphs(&texts, &fragments);

        debug!(
            text_candidates = texts.len(),
            markup_candidates = fragments.len(),
            paragraph_count = extracted.len(),
            "Paired docx paragraphs"
        );

        if extracted.is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(extracted)
    }

    fn accepted_extension(&self) -> &str {
        ACCEPTED_EXTENSION
    }
}
