//! Full structural pass: builds the complete table of contents, extracts
//! the document title and the cover-image payload.
//!
//! This traversal never produces text chunks; it mirrors the section
//! tracking of the normal read path but builds real tree nodes. Cache and
//! cover persistence are driven by the session afterwards.

use std::io::BufRead;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::parser::{EventReader, tags};
use crate::toc::SectionNode;

/// Captured cover-image reference and its base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPayload {
    /// Href as written on the image tag (usually `#<binary-id>`).
    pub href: String,
    /// Base64-encoded bytes from the matching binary block.
    pub encoded: String,
}

/// True if a binary block with the given `id` attribute is the target of
/// the captured cover href (`#id` or bare `id`).
fn binary_matches(href: &str, id: &str) -> bool {
    href.strip_prefix('#').unwrap_or(href) == id
}

/// Everything a full structural pass derives from the document.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Top-level sections in document order, children nested.
    pub toc: Vec<SectionNode>,
    /// Document-level title, first occurrence wins.
    pub book_title: Option<String>,
    pub cover: Option<CoverPayload>,
}

/// Run a single forward traversal from the reader's current position
/// (normally offset 0) to the end of the document.
pub fn scan_structure<R: BufRead>(reader: &mut EventReader<R>) -> Result<ScanOutcome> {
    // Open nodes, innermost last. Real nodes, not just ids: children attach
    // to their parent when the parent is still on the stack.
    let mut stack: Vec<SectionNode> = Vec::new();
    let mut outcome = ScanOutcome::default();

    // Contexts toggled strictly by matching enter/exit pairs, independent
    // of the section stack.
    let mut inside_title = false;
    let mut inside_book_title = false;
    let mut inside_cover_page = false;
    let mut inside_cover_binary = false;

    let mut cover_href: Option<String> = None;
    let mut cover_encoded: Option<String> = None;

    let mut event = reader.next()?;
    while !event.is_document_end() {
        if event.entering(tags::SECTION) {
            debug!("entered section at {}", event.offset);
            stack.push(SectionNode::open_at(event.offset));
        } else if event.exiting(tags::SECTION) {
            debug!("exited section at {}", event.offset);
            let mut node = stack
                .pop()
                .ok_or_else(|| Error::Malformed("section exit without matching enter".into()))?;
            node.finalize(event.offset);
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => outcome.toc.push(node),
            }
        } else if event.entering(tags::TITLE) {
            inside_title = true;
        } else if event.exiting(tags::TITLE) {
            inside_title = false;
        } else if event.entering(tags::BOOK_TITLE) {
            inside_book_title = true;
        } else if event.exiting(tags::BOOK_TITLE) {
            inside_book_title = false;
        } else if event.entering(tags::COVER_PAGE) {
            inside_cover_page = true;
        } else if event.exiting(tags::COVER_PAGE) {
            inside_cover_page = false;
        } else if event.entering(tags::BINARY) {
            // Only the binary block referenced from the cover page counts.
            if let (Some(href), Some(id)) = (&cover_href, event.attr("id"))
                && binary_matches(href, id)
            {
                inside_cover_binary = true;
            }
        } else if event.exiting(tags::BINARY) {
            inside_cover_binary = false;
        } else if inside_cover_page && event.entering(tags::IMAGE) {
            if let Some(href) = event.attr_containing("href") {
                cover_href = Some(href.to_string());
            }
        } else if let crate::parser::XmlEventKind::Content { tag, text } = &event.kind {
            if inside_title {
                if let Some(node) = stack.last_mut() {
                    node.push_title_fragment(text);
                }
            } else if tag == tags::BOOK_TITLE {
                // First-wins: never overwrite an already-seen title.
                if inside_book_title && outcome.book_title.is_none() {
                    outcome.book_title = Some(text.clone());
                }
            } else if inside_cover_binary && tag == tags::BINARY {
                cover_encoded
                    .get_or_insert_with(String::new)
                    .push_str(text);
            }
        }

        event = reader.next()?;
    }

    if !stack.is_empty() {
        warn!("{} section(s) left open at end of document", stack.len());
    }

    if let (Some(href), Some(encoded)) = (cover_href, cover_encoded) {
        outcome.cover = Some(CoverPayload { href, encoded });
    }

    Ok(outcome)
}
