//! Streaming pull parser over an FB2 byte stream.
//!
//! [`EventReader`] wraps a `quick_xml::Reader` and exposes a flat sequence
//! of [`XmlEvent`]s together with a running byte offset, which is the basis
//! for section identity and resume positions. It knows nothing about
//! sections or chunks; higher layers interpret the events.

pub mod event;
pub mod tags;

pub use event::{XmlEvent, XmlEventKind};

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::util;

/// Number of leading bytes sampled for encoding detection.
const ENCODING_SAMPLE_LEN: u64 = 1024;

/// Discard granularity for forward skips.
const SKIP_CHUNK: usize = 4096;

/// Pull-based XML event reader with byte-offset tracking.
///
/// Offsets strictly increase; [`position`](Self::position) is the offset of
/// the next unread byte. Forward repositioning via [`skip`](Self::skip) is
/// supported for resuming a previous session; seeking backward is not.
pub struct EventReader<R: BufRead> {
    inner: Option<Reader<R>>,
    buf: Vec<u8>,
    /// Names of currently open tags; the top is the content type of any
    /// text event.
    open_tags: Vec<String>,
    /// Bytes discarded ahead of the quick-xml reader by `skip`.
    base_offset: u64,
    offset: u64,
    /// Structural event held back while a content run was being emitted.
    pending: Option<XmlEvent>,
    encoding: &'static Encoding,
    at_end: bool,
}

impl EventReader<BufReader<File>> {
    /// Open a document file, auto-detecting its character encoding from a
    /// leading byte sample before the main event loop starts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut sample = Vec::with_capacity(ENCODING_SAMPLE_LEN as usize);
        File::open(path)?
            .take(ENCODING_SAMPLE_LEN)
            .read_to_end(&mut sample)?;

        let encoding = util::detect_encoding(&sample).unwrap_or(encoding_rs::UTF_8);
        if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            // Byte offsets and quick-xml's byte-oriented scanning assume an
            // ASCII-compatible encoding.
            return Err(Error::Malformed(format!(
                "unsupported encoding: {}",
                encoding.name()
            )));
        }

        let file = File::open(path)?;
        Ok(Self::from_buf_read(BufReader::new(file), encoding))
    }
}

impl<R: BufRead> EventReader<R> {
    /// Wrap an already-open byte stream, assuming UTF-8.
    pub fn from_reader(reader: R) -> Self {
        Self::from_buf_read(reader, encoding_rs::UTF_8)
    }

    fn from_buf_read(reader: R, encoding: &'static Encoding) -> Self {
        let mut inner = Reader::from_reader(reader);
        let config = inner.config_mut();
        // Self-closing tags surface as EnterTag + ExitTag so tag contexts
        // stay balanced.
        config.expand_empty_elements = true;
        // Resuming mid-document starts inside an element; end tags will not
        // match anything we saw.
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        // Whitespace is trimmed after merging text and entity-reference
        // pieces, not per quick-xml event; per-event trimming would eat the
        // spaces around an entity reference.

        EventReader {
            inner: Some(inner),
            buf: Vec::new(),
            open_tags: Vec::new(),
            base_offset: 0,
            offset: 0,
            pending: None,
            encoding,
            at_end: false,
        }
    }

    /// The detected character encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Reposition forward to absolute offset `target` by reading and
    /// discarding bytes. Intended to be called before any event has been
    /// pulled; used to resume a previous session mid-document.
    pub fn skip(&mut self, target: u64) -> Result<()> {
        if target < self.offset {
            return Err(Error::InvalidState("event reader cannot seek backward"));
        }
        let inner = self
            .inner
            .as_mut()
            .ok_or(Error::InvalidState("event reader is closed"))?;

        let src = inner.get_mut();
        let mut remaining = target - self.offset;
        let mut chunk = [0u8; SKIP_CHUNK];
        while remaining > 0 {
            let want = remaining.min(SKIP_CHUNK as u64) as usize;
            let n = src.read(&mut chunk[..want])?;
            if n == 0 {
                // Target lies past end of file; stop at EOF.
                self.at_end = true;
                break;
            }
            remaining -= n as u64;
            self.base_offset += n as u64;
        }
        self.offset = self.base_offset + inner.buffer_position();
        Ok(())
    }

    /// Pull the next parse event.
    ///
    /// Consecutive text, CDATA and entity-reference pieces inside one
    /// element merge into a single [`XmlEventKind::Content`] event, so an
    /// entity reference never splits the prose around it. Returns
    /// [`XmlEventKind::DocumentEnd`] at end of stream (repeatedly, if
    /// called again). Fails with [`Error::Xml`] or [`Error::Malformed`]
    /// when the underlying stream yields invalid structure.
    pub fn next(&mut self) -> Result<XmlEvent> {
        if let Some(event) = self.pending.take() {
            self.offset = event.offset;
            return Ok(event);
        }
        let inner = self
            .inner
            .as_mut()
            .ok_or(Error::InvalidState("event reader is closed"))?;
        if self.at_end {
            return Ok(XmlEvent {
                kind: XmlEventKind::DocumentEnd,
                offset: self.offset,
            });
        }

        // The current content run: raw pieces accumulate until a structural
        // event closes the run.
        let mut text = String::new();
        let mut text_tag: Option<String> = None;
        let mut text_end = self.offset;

        loop {
            self.buf.clear();
            let event = inner.read_event_into(&mut self.buf)?;
            let pos = self.base_offset + inner.buffer_position();

            let structural = match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let mut attributes = Vec::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| Error::Malformed(e.to_string()))?;
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        let value = util::decode_text(&attr.value, self.encoding).into_owned();
                        attributes.push((key, value));
                    }
                    self.open_tags.push(name.clone());
                    XmlEvent {
                        kind: XmlEventKind::EnterTag { name, attributes },
                        offset: pos,
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.open_tags.pop();
                    XmlEvent {
                        kind: XmlEventKind::ExitTag { name },
                        offset: pos,
                    }
                }
                Event::Text(t) => {
                    if let Some(tag) = self.open_tags.last() {
                        text_tag.get_or_insert_with(|| tag.clone());
                        text.push_str(&util::decode_text(&t, self.encoding));
                        text_end = pos;
                    }
                    continue; // stray text outside any element is dropped
                }
                Event::CData(t) => {
                    if let Some(tag) = self.open_tags.last() {
                        text_tag.get_or_insert_with(|| tag.clone());
                        text.push_str(&util::decode_text(&t, self.encoding));
                        text_end = pos;
                    }
                    continue;
                }
                Event::GeneralRef(e) => {
                    if let Some(tag) = self.open_tags.last() {
                        text_tag.get_or_insert_with(|| tag.clone());
                        let entity = util::decode_text(&e, self.encoding);
                        text.push_str(&resolve_entity(&entity));
                        text_end = pos;
                    }
                    continue;
                }
                Event::Eof => {
                    self.at_end = true;
                    XmlEvent {
                        kind: XmlEventKind::DocumentEnd,
                        offset: pos,
                    }
                }
                // Declarations, processing instructions, comments and
                // doctypes carry no reading content.
                _ => continue,
            };

            let trimmed = text.trim();
            if let Some(tag) = text_tag
                && !trimmed.is_empty()
            {
                // Emit the content run first; the structural event that
                // closed it comes out on the next pull.
                self.pending = Some(structural);
                self.offset = text_end;
                return Ok(XmlEvent {
                    kind: XmlEventKind::Content {
                        tag,
                        text: trimmed.to_string(),
                    },
                    offset: text_end,
                });
            }
            self.offset = pos;
            return Ok(structural);
        }
    }

    /// Release the underlying stream. Calling this twice is a no-op;
    /// subsequent [`next`](Self::next) calls fail with `InvalidState`.
    pub fn close(&mut self) {
        self.inner = None;
        self.pending = None;
    }
}

/// Resolve one entity reference. Numeric character references and the
/// predefined XML entities become their characters; unknown entities are
/// kept verbatim rather than dropped.
fn resolve_entity(entity: &str) -> String {
    if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(entity) {
        return resolved.to_string();
    }
    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    match code.and_then(char::from_u32) {
        Some(c) => c.to_string(),
        None => format!("&{entity};"),
    }
}
