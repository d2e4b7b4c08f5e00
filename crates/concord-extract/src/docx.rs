//! Reader for WordprocessingML (`.docx`) packages.
//!
//! A `.docx` file is a zip archive. The body lives in `word/document.xml`;
//! style names come from `word/styles.xml` and hyperlink targets from
//! `word/_rels/document.xml.rels`. Both optional parts may be absent.
//!
//! The reader produces a [`Block`] tree that both renderers walk, so the
//! markup and plain-text views come from the same conversion pass.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use roxmltree::Node;
use tracing::trace;
use zip::result::ZipError;
use zip::ZipArchive;

use concord_core::{Error, Result};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";

/// Block-level content of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        kind: ParagraphKind,
        inlines: Vec<Inline>,
    },
    /// Rows of cells; each cell holds its own blocks.
    Table(Vec<Vec<Vec<Block>>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Normal,
    Heading(u8),
    ListItem,
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text {
        text: String,
        bold: bool,
        italic: bool,
    },
    Break,
    Link {
        href: String,
        children: Vec<Inline>,
    },
}

/// Parse `.docx` bytes into body blocks, refusing any part that inflates
/// past `max_part_bytes`.
pub fn read_blocks_with_limit(bytes: &[u8], max_part_bytes: u64) -> Result<Vec<Block>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::MalformedDocument(format!("not a zip archive: {}", e)))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART, max_part_bytes)?
        .ok_or_else(|| Error::MalformedDocument(format!("missing {}", DOCUMENT_PART)))?;

    let styles = match read_part(&mut archive, STYLES_PART, max_part_bytes)? {
        Some(xml) => parse_style_names(&xml)?,
        None => HashMap::new(),
    };
    let links = match read_part(&mut archive, RELS_PART, max_part_bytes)? {
        Some(xml) => parse_hyperlink_targets(&xml)?,
        None => HashMap::new(),
    };

    let doc = roxmltree::Document::parse(&document_xml)
        .map_err(|e| Error::MalformedDocument(format!("invalid {}: {}", DOCUMENT_PART, e)))?;

    let body = doc
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| Error::MalformedDocument("document has no body".to_string()))?;

    let ctx = Context {
        styles: &styles,
        links: &links,
    };
    let mut blocks = Vec::new();
    ctx.collect_blocks(body, &mut blocks);
    trace!(block_count = blocks.len(), "Read docx body");
    Ok(blocks)
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(Error::MalformedDocument(format!(
                "unreadable part {}: {}",
                name, e
            )))
        }
    };
    let too_large = || {
        Error::MalformedDocument(format!(
            "part {} inflates past {} bytes",
            name, max_bytes
        ))
    };
    // The declared size can lie, so the read itself is capped too.
    if file.size() > max_bytes {
        return Err(too_large());
    }
    let mut xml = String::new();
    file.by_ref()
        .take(max_bytes + 1)
        .read_to_string(&mut xml)
        .map_err(|e| Error::MalformedDocument(format!("unreadable part {}: {}", name, e)))?;
    if xml.len() as u64 > max_bytes {
        return Err(too_large());
    }
    Ok(Some(xml))
}

/// Map of style id to style display name.
fn parse_style_names(xml: &str) -> Result<HashMap<String, String>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::MalformedDocument(format!("invalid {}: {}", STYLES_PART, e)))?;
    let mut names = HashMap::new();
    for style in doc.descendants().filter(|n| is_w(n, "style")) {
        let Some(id) = style.attribute((W_NS, "styleId")) else {
            continue;
        };
        if let Some(name) = style
            .children()
            .find(|n| is_w(n, "name"))
            .and_then(|n| n.attribute((W_NS, "val")))
        {
            names.insert(id.to_string(), name.to_string());
        }
    }
    Ok(names)
}

/// Map of relationship id to hyperlink target.
fn parse_hyperlink_targets(xml: &str) -> Result<HashMap<String, String>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::MalformedDocument(format!("invalid {}: {}", RELS_PART, e)))?;
    let mut targets = HashMap::new();
    for rel in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
    {
        let is_link = rel
            .attribute("Type")
            .map(|t| t.ends_with("/hyperlink"))
            .unwrap_or(false);
        if let (true, Some(id), Some(target)) = (is_link, rel.attribute("Id"), rel.attribute("Target"))
        {
            targets.insert(id.to_string(), target.to_string());
        }
    }
    Ok(targets)
}

fn is_w(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local && node.tag_name().namespace() == Some(W_NS)
}

/// `w:b` / `w:i` style toggles: present means on unless `w:val` says otherwise.
fn toggle_on(node: Node) -> bool {
    !matches!(node.attribute((W_NS, "val")), Some("0" | "false" | "off"))
}

/// Heading level for a style, by display name ("Heading 2") or id ("Heading2").
pub(crate) fn heading_level(style_id: &str, styles: &HashMap<String, String>) -> Option<u8> {
    let name = styles.get(style_id).map(String::as_str).unwrap_or(style_id);
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if normalized == "title" {
        return Some(1);
    }
    let level: u8 = normalized.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

struct Context<'a> {
    styles: &'a HashMap<String, String>,
    links: &'a HashMap<String, String>,
}

impl Context<'_> {
    fn collect_blocks(&self, container: Node, out: &mut Vec<Block>) {
        for child in container.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "p" => out.push(self.paragraph(child)),
                "tbl" => out.push(self.table(child)),
                "sdt" => {
                    if let Some(content) = child.children().find(|n| is_w(n, "sdtContent")) {
                        self.collect_blocks(content, out);
                    }
                }
                "customXml" | "ins" => self.collect_blocks(child, out),
                _ => {}
            }
        }
    }

    fn table(&self, tbl: Node) -> Block {
        let rows = tbl
            .children()
            .filter(|n| is_w(n, "tr"))
            .map(|tr| {
                tr.children()
                    .filter(|n| is_w(n, "tc"))
                    .map(|tc| {
                        let mut cell = Vec::new();
                        self.collect_blocks(tc, &mut cell);
                        cell
                    })
                    .collect()
            })
            .collect();
        Block::Table(rows)
    }

    fn paragraph(&self, p: Node) -> Block {
        let mut kind = ParagraphKind::Normal;
        if let Some(ppr) = p.children().find(|n| is_w(n, "pPr")) {
            let heading = ppr
                .children()
                .find(|n| is_w(n, "pStyle"))
                .and_then(|s| s.attribute((W_NS, "val")))
                .and_then(|id| heading_level(id, self.styles));
            if let Some(level) = heading {
                kind = ParagraphKind::Heading(level);
            } else if ppr.children().any(|n| is_w(&n, "numPr")) {
                kind = ParagraphKind::ListItem;
            }
        }
        let mut inlines = Vec::new();
        self.collect_inlines(p, &mut inlines);
        Block::Paragraph { kind, inlines }
    }

    fn collect_inlines(&self, container: Node, out: &mut Vec<Inline>) {
        for child in container.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "r" => self.run(child, out),
                "hyperlink" => {
                    let mut children = Vec::new();
                    self.collect_inlines(child, &mut children);
                    let href = child
                        .attribute((R_NS, "id"))
                        .and_then(|id| self.links.get(id).cloned())
                        .or_else(|| child.attribute((W_NS, "anchor")).map(|a| format!("#{}", a)));
                    match href {
                        Some(href) => out.push(Inline::Link { href, children }),
                        None => out.extend(children),
                    }
                }
                "ins" | "smartTag" | "fldSimple" | "customXml" => {
                    self.collect_inlines(child, out)
                }
                "sdt" => {
                    if let Some(content) = child.children().find(|n| is_w(n, "sdtContent")) {
                        self.collect_inlines(content, out);
                    }
                }
                // w:del, w:moveFrom, w:pPr, bookmarks, proofing marks
                _ => {}
            }
        }
    }

    fn run(&self, r: Node, out: &mut Vec<Inline>) {
        let (mut bold, mut italic) = (false, false);
        if let Some(rpr) = r.children().find(|n| is_w(n, "rPr")) {
            for prop in rpr.children().filter(|n| n.is_element()) {
                match prop.tag_name().name() {
                    "b" => bold = toggle_on(prop),
                    "i" => italic = toggle_on(prop),
                    _ => {}
                }
            }
        }

        let mut buf = String::new();
        let flush = |buf: &mut String, out: &mut Vec<Inline>| {
            if !buf.is_empty() {
                out.push(Inline::Text {
                    text: std::mem::take(buf),
                    bold,
                    italic,
                });
            }
        };

        for child in r.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "t" => buf.push_str(child.text().unwrap_or("")),
                "tab" => buf.push('\t'),
                "noBreakHyphen" => buf.push('-'),
                "br" => {
                    // Page and column breaks carry no text.
                    if matches!(child.attribute((W_NS, "type")), None | Some("textWrapping")) {
                        flush(&mut buf, out);
                        out.push(Inline::Break);
                    }
                }
                "cr" => {
                    flush(&mut buf, out);
                    out.push(Inline::Break);
                }
                // w:drawing, w:pict, w:object: images are dropped
                _ => {}
            }
        }
        flush(&mut buf, out);
    }
}
