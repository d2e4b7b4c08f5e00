//! Markup and plain-text renderings of a block tree.

use crate::docx::{Block, Inline, ParagraphKind};

/// Render blocks as HTML. Empty paragraphs are omitted and consecutive list
/// items are grouped into one `<ul>`.
pub fn to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for block in blocks {
        let is_list_item = matches!(
            block,
            Block::Paragraph {
                kind: ParagraphKind::ListItem,
                ..
            }
        );
        if in_list && !is_list_item {
            html.push_str("</ul>");
            in_list = false;
        }

        match block {
            Block::Paragraph { kind, inlines } => {
                let content = inlines_html(inlines);
                if content.trim().is_empty() {
                    continue;
                }
                match kind {
                    ParagraphKind::Normal => {
                        html.push_str("<p>");
                        html.push_str(&content);
                        html.push_str("</p>");
                    }
                    ParagraphKind::Heading(level) => {
                        html.push_str(&format!("<h{}>{}</h{}>", level, content, level));
                    }
                    ParagraphKind::ListItem => {
                        if !in_list {
                            html.push_str("<ul>");
                            in_list = true;
                        }
                        html.push_str("<li>");
                        html.push_str(&content);
                        html.push_str("</li>");
                    }
                }
            }
            Block::Table(rows) => {
                html.push_str("<table>");
                for row in rows {
                    html.push_str("<tr>");
                    for cell in row {
                        html.push_str("<td>");
                        html.push_str(&to_html(cell));
                        html.push_str("</td>");
                    }
                    html.push_str("</tr>");
                }
                html.push_str("</table>");
            }
        }
    }
    if in_list {
        html.push_str("</ul>");
    }
    html
}

fn inlines_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { text, bold, italic } => {
                let mut piece = escape_html(text);
                if *italic {
                    piece = format!("<em>{}</em>", piece);
                }
                if *bold {
                    piece = format!("<strong>{}</strong>", piece);
                }
                out.push_str(&piece);
            }
            Inline::Break => out.push_str("<br />"),
            Inline::Link { href, children } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(href),
                    inlines_html(children)
                ));
            }
        }
    }
    out
}

/// Render blocks as plain text: every paragraph followed by a blank line.
pub fn to_text(blocks: &[Block]) -> String {
    let mut text = String::new();
    for block in blocks {
        match block {
            Block::Paragraph { inlines, .. } => {
                push_inline_text(inlines, &mut text);
                text.push_str("\n\n");
            }
            Block::Table(rows) => {
                for cell in rows.iter().flatten() {
                    text.push_str(&to_text(cell));
                }
            }
        }
    }
    text
}

fn push_inline_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text, .. } => out.push_str(text),
            Inline::Break => out.push('\n'),
            Inline::Link { children, .. } => push_inline_text(children, out),
        }
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
