//! Positional pairing of plain-text paragraphs with markup fragments.
//!
//! The text and markup views are split independently and then zipped by
//! position. This is a heuristic: the two views can disagree on segment
//! count (list items render as `<li>`, not `<p>`). The plain-text sequence
//! is authoritative for filtering and count; markup degrades to the plain
//! text when no fragment exists at a position.

use std::sync::OnceLock;

use regex::Regex;

use concord_core::ExtractedParagraph;

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\r?\n){2,}").expect("valid paragraph break regex"))
}

fn block_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<p(?:\s[^>]*)?>(.*?)</p>|<h([1-6])(?:\s[^>]*)?>(.*?)</h[1-6]>")
            .expect("valid block element regex")
    })
}

/// Split plain text on runs of two or more line breaks, trimming each
/// candidate and dropping the empty ones.
pub fn split_text_paragraphs(text: &str) -> Vec<String> {
    paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Inner content of `<p>` and `<h1>`..`<h6>` elements, trimmed, empty ones
/// dropped. Falls back to the whole markup as one fragment when no element
/// matches but the markup is non-empty.
pub fn extract_markup_fragments(html: &str) -> Vec<String> {
    let fragments: Vec<String> = block_element()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim())
        .filter(|content| !content.is_empty())
        .map(String::from)
        .collect();

    if fragments.is_empty() && !html.trim().is_empty() {
        return vec![html.trim().to_string()];
    }
    fragments
}

/// Zip text paragraphs and markup fragments by position, skipping positions
/// whose text is empty and numbering the survivors densely from zero.
pub fn pair_paragraphs(texts: &[String], fragments: &[String]) -> Vec<ExtractedParagraph> {
    let len = texts.len().max(fragments.len());
    let mut paragraphs = Vec::with_capacity(texts.len());

    for i in 0..len {
        let text = texts.get(i).map(String::as_str).unwrap_or("");
        if text.trim().is_empty() {
            continue;
        }
        let html = fragments
            .get(i)
            .cloned()
            .unwrap_or_else(|| text.to_string());
        paragraphs.push(ExtractedParagraph::new(
            paragraphs.len(),
            text.to_string(),
            html,
        ));
    }
    paragraphs
}
