//! Reading session over one open document.
//!
//! [`BookSession`] owns the event reader, the chunk queue and the derived
//! caches, and reconciles persisted position state across process
//! restarts. At most one in-flight operation per session; the core
//! provides no internal locking.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::cache::CacheDir;
use crate::chunks::{CHUNK_SIZE, ChunkInfo, ChunkQueue, TextBlock};
use crate::cover::{self, ColorSampler, NoSampler};
use crate::error::{Error, Result};
use crate::parser::{EventReader, XmlEvent, tags};
use crate::scan;
use crate::store::{BookRecord, RecordPatch, RecordStore};
use crate::toc::{self, SectionNode};

/// Lazily loaded, cache-backed field. A failed load is remembered so it
/// is not silently re-attempted forever.
#[derive(Debug, Default)]
enum CacheSlot<T> {
    #[default]
    NotLoaded,
    Loaded(T),
    Failed,
}

impl<T> CacheSlot<T> {
    fn loaded(&self) -> Option<&T> {
        match self {
            CacheSlot::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Chunk-relative progress snapshot supplied by the display layer right
/// before a persist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Fractional position within the currently displayed chunk:
    /// 0 at its start, approaching 1 at its end.
    pub chunk_fraction: f64,
    /// Logical position within the flattened text stream.
    pub text_position: usize,
}

/// Interpolated read-progress estimate.
///
/// `current / size` plus `chunk_fraction` of the span up to the next chunk
/// boundary, so progress moves smoothly between boundaries instead of
/// jumping at chunk granularity. An empty document reads as fully read.
pub fn interpolate_percentile(
    current: u64,
    next_boundary: u64,
    file_size: u64,
    chunk_fraction: f64,
) -> f64 {
    if file_size == 0 {
        return 1.0;
    }
    let size = file_size as f64;
    let span = next_boundary.saturating_sub(current) as f64;
    current as f64 / size + chunk_fraction * span / size
}

/// A streaming, resumable reading session over one FB2 document.
pub struct BookSession {
    path: PathBuf,
    file_size: u64,
    cache: CacheDir,
    sampler: Box<dyn ColorSampler>,

    reader: Option<EventReader<BufReader<File>>>,
    /// One-step lookahead: the event pulled but not yet processed.
    current_event: Option<XmlEvent>,

    title: Option<String>,
    time_opened: Option<String>,

    /// Offset where the block currently being displayed began.
    current_byte: Option<u64>,
    /// Offset after the most recently consumed event; the resume point.
    last_byte: u64,
    current_section_id: Option<String>,
    current_section_title: Option<String>,
    current_text_offset: usize,
    chunk_fraction: f64,
    percentile: f64,

    /// Ids of sections entered but not yet exited on the read path.
    section_stack: Vec<String>,
    loaded_chunks: ChunkQueue,

    table_of_contents: CacheSlot<Vec<SectionNode>>,
    id_title_map: CacheSlot<HashMap<String, String>>,

    processed: bool,
    fully_processed: bool,
    fully_processing_success: Option<bool>,

    cover_path: Option<PathBuf>,
    cover_color: Option<u32>,
}

impl BookSession {
    /// Attach to a document file, auto-detecting its encoding.
    pub fn open(path: impl AsRef<Path>, cache: CacheDir) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file_size = fs::metadata(&path)?.len();
        let reader = EventReader::open(&path)?;

        Ok(BookSession {
            path,
            file_size,
            cache,
            sampler: Box::new(NoSampler),
            reader: Some(reader),
            current_event: None,
            title: None,
            time_opened: None,
            current_byte: None,
            last_byte: 0,
            current_section_id: None,
            current_section_title: None,
            current_text_offset: 0,
            chunk_fraction: 0.0,
            percentile: 0.0,
            section_stack: Vec::new(),
            loaded_chunks: ChunkQueue::new(),
            table_of_contents: CacheSlot::NotLoaded,
            id_title_map: CacheSlot::NotLoaded,
            processed: false,
            fully_processed: false,
            fully_processing_success: None,
            cover_path: None,
            cover_color: None,
        })
    }

    /// Replace the cover color collaborator.
    pub fn with_color_sampler(mut self, sampler: impl ColorSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Record the caller-supplied opened-at stamp; carried through
    /// persist untouched.
    pub fn set_time_opened(&mut self, stamp: impl Into<String>) {
        self.time_opened = Some(stamp.into());
    }

    // ------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------

    /// Load prior persisted state and fast-forward the stream to the
    /// stored resume offset. Callers must check
    /// [`RecordStore::exists`] first; hydrating a never-persisted
    /// document is a contract violation.
    pub fn hydrate(&mut self, store: &dyn RecordStore) -> Result<()> {
        let record = store
            .load(&self.path)
            .ok_or(Error::InvalidState("no persisted record for this document"))?;

        if !record.title.is_empty() {
            self.title = Some(record.title);
        }
        self.current_text_offset = record.text_offset;
        self.time_opened = record.time_opened;
        self.percentile = record.percentile;
        self.current_section_id = record.section_id;
        self.current_section_title = record.section_title;
        self.current_byte = Some(record.byte_position);
        self.last_byte = record.byte_position;
        self.fully_processed = record.fully_processed;
        self.fully_processing_success = record.fully_processing_success;
        self.cover_path = record.cover_path;
        self.cover_color = record.cover_color;

        if record.byte_position > 0 {
            let reader = self
                .reader
                .as_mut()
                .ok_or(Error::InvalidState("session is closed"))?;
            reader.skip(record.byte_position)?;
        }

        if self.cache.has_id_title_map(&self.path) {
            self.id_title_map = match self.cache.read_id_title_map(&self.path) {
                Ok(map) => CacheSlot::Loaded(map),
                Err(e) => {
                    warn!("failed to load id/title cache: {e}");
                    CacheSlot::Failed
                }
            };
        }
        self.processed = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Normal read path
    // ------------------------------------------------------------------

    /// Pull events until the stream ends or the accumulated prose reaches
    /// the chunk threshold, then emit one text block. The block always
    /// ends on an event boundary, never mid-event.
    pub fn read_next_chunk(&mut self) -> Result<TextBlock> {
        let reader = self
            .reader
            .as_mut()
            .ok_or(Error::InvalidState("session is closed"))?;

        // Start of this block; the resume point of the previous pull.
        self.current_byte = Some(self.last_byte);

        let mut text = String::new();
        let mut units = 0usize;

        if self.current_event.is_none() {
            let event = reader.next()?;
            self.last_byte = reader.position();
            self.current_event = Some(event);
        }

        loop {
            let event = match self.current_event.take() {
                None => break,
                Some(event) if event.is_document_end() || units >= CHUNK_SIZE => {
                    // Leave the terminal/overflow event for the next pull.
                    self.current_event = Some(event);
                    break;
                }
                Some(event) => event,
            };

            if event.entering(tags::SECTION) {
                let id = toc::section_id(event.offset);
                debug!("entering {} at {}", id, event.offset);
                self.section_stack.push(id.clone());
                if let Some(map) = self.id_title_map.loaded()
                    && let Some(title) = map.get(&id)
                {
                    self.current_section_title = Some(title.clone());
                }
                self.current_section_id = Some(id);
            } else if event.exiting(tags::SECTION) {
                debug!("exiting section at {}", event.offset);
                // Tolerates malformed nesting.
                self.section_stack.pop();
                if let Some(parent) = self.section_stack.last() {
                    self.current_section_id = Some(parent.clone());
                }
            } else if let Some(content) = event.content_of(tags::PARAGRAPH) {
                text.push_str(content);
                text.push(' ');
                units += content.chars().count() + 1;
            }

            self.last_byte = reader.position();
            self.current_event = Some(reader.next()?);
        }

        self.loaded_chunks.push(ChunkInfo {
            section_id: self.current_section_id.clone(),
            section_title: self.current_section_title.clone(),
            byte_position: self.current_byte.unwrap_or(0),
        });
        debug!(
            "queued chunk for {:?} at {:?}",
            self.current_section_id, self.current_byte
        );

        Ok(TextBlock {
            text,
            start_position: 0,
        })
    }

    /// Whether another chunk can be produced.
    pub fn has_more(&self) -> bool {
        !matches!(&self.current_event, Some(ev) if ev.is_document_end())
    }

    /// Caller rejected the most recently produced block.
    pub fn skip_last(&mut self) {
        self.loaded_chunks.pop_newest();
    }

    /// Caller consumed the oldest block and moved on.
    pub fn advance(&mut self) {
        self.loaded_chunks.pop_oldest();
    }

    // ------------------------------------------------------------------
    // Full structural pass
    // ------------------------------------------------------------------

    /// One-time full traversal: builds the table of contents, extracts
    /// the title and cover, and writes the derived caches.
    ///
    /// Cache or cover persistence failures are logged and leave the scan
    /// marked as a partial failure; in-memory structures stay usable.
    pub fn scan_full_structure(&mut self) -> Result<()> {
        // Flipped to true only at successful completion; any early return
        // leaves the document marked not fully processed.
        self.fully_processing_success = Some(false);

        let reader = self
            .reader
            .as_mut()
            .ok_or(Error::InvalidState("session is closed"))?;
        let outcome = scan::scan_structure(reader)?;

        if self.title.is_none() {
            self.title = outcome.book_title;
        }

        let mut persisted_ok = true;

        if let Some(payload) = &outcome.cover {
            match cover::decode_payload(&payload.encoded) {
                Ok(bytes) => match self.cache.write_cover(&self.path, &bytes) {
                    Ok(path) => {
                        self.cover_color = self.sampler.dominant_color(&bytes);
                        self.cover_path = Some(path);
                    }
                    Err(e) => {
                        warn!("failed to store cover image: {e}");
                        persisted_ok = false;
                    }
                },
                Err(e) => {
                    warn!("cover payload unusable: {e}");
                    persisted_ok = false;
                }
            }
        }

        if let Err(e) = self.cache.write_toc(&self.path, &outcome.toc) {
            warn!("failed to store TOC cache: {e}");
            persisted_ok = false;
        }
        let map = toc::id_title_map(&outcome.toc);
        if let Err(e) = self.cache.write_id_title_map(&self.path, &map) {
            warn!("failed to store id/title cache: {e}");
            persisted_ok = false;
        }

        let mut nodes = outcome.toc;
        for node in &mut nodes {
            node.attach_path(&self.path);
        }
        self.table_of_contents = CacheSlot::Loaded(nodes);
        self.id_title_map = CacheSlot::Loaded(map);

        self.processed = true;
        self.fully_processed = true;
        self.fully_processing_success = Some(persisted_ok);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Position integrity and persistence
    // ------------------------------------------------------------------

    /// Validate the stored (byte offset, section id) pair against the
    /// table of contents, snapping drifted offsets back to the section
    /// start. Re-reading from a section start is always safe; the end is
    /// not.
    fn reconcile(&mut self) {
        if matches!(self.table_of_contents, CacheSlot::NotLoaded)
            && self.fully_processed
            && self.cache.has_toc(&self.path)
        {
            self.table_of_contents = match self.cache.read_toc(&self.path) {
                Ok(toc) => CacheSlot::Loaded(toc),
                Err(e) => {
                    warn!("failed to load TOC cache: {e}");
                    CacheSlot::Failed
                }
            };
        }

        let Some(toc) = self.table_of_contents.loaded() else {
            return;
        };
        let Some(current_id) = &self.current_section_id else {
            return;
        };
        let Some(current) = self.current_byte else {
            return;
        };

        for node in toc::flatten(toc) {
            if &node.id == current_id
                && node.end_offset.is_some()
                && !node.contains_offset(current)
            {
                debug!(
                    "offset {} outside {} [{}, {:?}], snapping to section start",
                    current, node.id, node.start_offset, node.end_offset
                );
                self.current_byte = Some(node.start_offset);
            }
        }
    }

    fn calc_percentile(&self) -> f64 {
        let current = self.current_byte.unwrap_or(0);
        let next_boundary = self
            .loaded_chunks
            .oldest()
            .map(|chunk| chunk.byte_position)
            .unwrap_or(self.file_size);
        interpolate_percentile(current, next_boundary, self.file_size, self.chunk_fraction)
    }

    /// Reconcile position state, recompute the percentile and write the
    /// scalar fields to the persistence boundary. Inserts on first
    /// persist, otherwise updates only the fields that are semantically
    /// valid to write.
    pub fn persist(
        &mut self,
        store: &mut dyn RecordStore,
        snapshot: &ProgressSnapshot,
    ) -> Result<()> {
        if let Some(front) = self.loaded_chunks.oldest() {
            self.current_byte = Some(front.byte_position);
            self.current_section_id = front.section_id.clone();
            self.current_section_title = front.section_title.clone();
            self.chunk_fraction = snapshot.chunk_fraction;
            self.current_text_offset = snapshot.text_position;
            debug!(
                "persisting at {:?} (section {:?}, text position {})",
                self.current_byte, self.current_section_id, self.current_text_offset
            );
        }

        self.reconcile();
        let percentile = self.calc_percentile();
        let percentile_valid = (0.0..=1.0).contains(&percentile);
        if percentile_valid {
            self.percentile = percentile;
        }

        if store.exists(&self.path) {
            let mut patch = RecordPatch {
                title: self.title.clone(),
                text_offset: Some(self.current_text_offset),
                time_opened: self.time_opened.clone(),
                section_id: self.current_section_id.clone(),
                section_title: self.current_section_title.clone(),
                byte_position: self.current_byte,
                fully_processed: Some(self.fully_processed),
                fully_processing_success: self.fully_processing_success,
                ..Default::default()
            };
            if percentile_valid {
                patch.percentile = Some(percentile);
            }
            if self.cover_path.is_some() {
                patch.cover_path = self.cover_path.clone();
                patch.cover_color = self.cover_color;
            }
            store.update(&self.path, patch);
        } else {
            store.insert(BookRecord {
                path: self.path.clone(),
                title: self
                    .title
                    .clone()
                    .unwrap_or_else(|| default_title(&self.path)),
                text_offset: self.current_text_offset,
                time_opened: self.time_opened.clone(),
                percentile: if percentile_valid { percentile } else { 0.0 },
                section_id: self.current_section_id.clone(),
                section_title: self.current_section_title.clone(),
                byte_position: self.current_byte.unwrap_or(0),
                fully_processed: self.fully_processed,
                fully_processing_success: self.fully_processing_success,
                cover_path: self.cover_path.clone(),
                cover_color: self.cover_color,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation and accessors
    // ------------------------------------------------------------------

    /// The table of contents, lazily loaded from cache once the document
    /// has been fully processed.
    pub fn table_of_contents(&mut self) -> Option<&[SectionNode]> {
        if matches!(self.table_of_contents, CacheSlot::NotLoaded)
            && self.fully_processed
            && self.cache.has_toc(&self.path)
        {
            self.table_of_contents = match self.cache.read_toc(&self.path) {
                Ok(toc) => CacheSlot::Loaded(toc),
                Err(e) => {
                    warn!("failed to load TOC cache: {e}");
                    CacheSlot::Failed
                }
            };
        }
        self.table_of_contents.loaded().map(|toc| toc.as_slice())
    }

    /// Jump the session's position to the start of a TOC entry.
    pub fn set_current_section(&mut self, node: &SectionNode) {
        self.current_section_id = Some(node.id.clone());
        self.current_section_title = node.title.clone();
        self.current_byte = Some(node.start_offset);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn current_section_id(&self) -> Option<&str> {
        self.current_section_id.as_deref()
    }

    pub fn current_section_title(&self) -> Option<&str> {
        self.current_section_title.as_deref()
    }

    pub fn current_text_offset(&self) -> usize {
        self.current_text_offset
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Whether document metadata has been loaded, by hydrating a prior
    /// record or by a structural scan.
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn is_fully_processed(&self) -> bool {
        self.fully_processed
    }

    pub fn processing_success(&self) -> Option<bool> {
        self.fully_processing_success
    }

    pub fn cover_path(&self) -> Option<&Path> {
        self.cover_path.as_deref()
    }

    pub fn cover_color(&self) -> Option<u32> {
        self.cover_color
    }

    pub fn pending_chunks(&self) -> usize {
        self.loaded_chunks.len()
    }

    /// Release the underlying stream. Subsequent reads fail with
    /// `InvalidState`. Dropping the session releases the stream too, but
    /// explicit close is the intended path.
    pub fn close(&mut self) {
        if let Some(reader) = &mut self.reader {
            reader.close();
        }
        self.reader = None;
        self.current_event = None;
    }
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(xml.as_bytes()).unwrap();
        path
    }

    fn session(dir: &TempDir, xml: &str) -> BookSession {
        let doc = write_doc(dir, "book.fb2", xml);
        let cache = CacheDir::new(dir.path().join("cache"));
        BookSession::open(&doc, cache).unwrap()
    }

    const SMALL: &str = "<FictionBook><body>\
        <section><p>first paragraph</p><p>second paragraph</p></section>\
        </body></FictionBook>";

    #[test]
    fn test_open_missing_file_is_io_failure() {
        let result = BookSession::open("/nonexistent/book.fb2", CacheDir::new("/tmp"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_hydrate_without_record_is_invalid_state() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);
        let store = MemoryStore::new();
        assert!(matches!(
            session.hydrate(&store),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_read_next_chunk_collects_prose() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);
        assert!(session.has_more());
        let block = session.read_next_chunk().unwrap();
        assert_eq!(block.text, "first paragraph second paragraph ");
        assert_eq!(block.start_position, 0);
        assert!(!session.has_more());
        assert_eq!(session.pending_chunks(), 1);
    }

    #[test]
    fn test_chunk_preserves_entity_text() {
        let dir = TempDir::new().unwrap();
        let mut session = session(
            &dir,
            "<FictionBook><body><section><p>a &amp; b</p></section></body></FictionBook>",
        );
        let block = session.read_next_chunk().unwrap();
        assert_eq!(block.text, "a & b ");
    }

    #[test]
    fn test_chunk_threshold_stops_at_event_boundary() {
        // 4096+1 units of prose split across two paragraphs: the first
        // chunk must contain both in full, not a mid-event split.
        let first = "a".repeat(3000);
        let second = "b".repeat(1097);
        let xml = format!(
            "<FictionBook><body><section><p>{first}</p><p>{second}</p>\
             <p>next chunk</p></section></body></FictionBook>"
        );
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &xml);

        let block = session.read_next_chunk().unwrap();
        assert!(block.text.starts_with(&first));
        assert!(block.text.contains(&second));
        assert!(!block.text.contains("next chunk"));
        assert!(session.has_more());

        let rest = session.read_next_chunk().unwrap();
        assert_eq!(rest.text, "next chunk ");
    }

    #[test]
    fn test_chunk_queue_discipline() {
        let first = "a".repeat(4100);
        let second = "b".repeat(4100);
        let xml = format!(
            "<FictionBook><body><section><p>{first}</p><p>{second}</p>\
             <p>tail</p></section></body></FictionBook>"
        );
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, &xml);

        session.read_next_chunk().unwrap();
        session.read_next_chunk().unwrap();
        session.read_next_chunk().unwrap();
        assert_eq!(session.pending_chunks(), 3);

        session.skip_last();
        assert_eq!(session.pending_chunks(), 2);
        session.advance();
        assert_eq!(session.pending_chunks(), 1);
    }

    #[test]
    fn test_read_after_close_is_invalid_state() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);
        session.close();
        session.close(); // idempotent
        assert!(matches!(
            session.read_next_chunk(),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_scan_marks_processed_and_success() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);
        assert!(!session.is_processed());
        assert!(!session.is_fully_processed());
        session.scan_full_structure().unwrap();
        assert!(session.is_processed());
        assert!(session.is_fully_processed());
        assert_eq!(session.processing_success(), Some(true));
        assert_eq!(session.table_of_contents().unwrap().len(), 1);
    }

    #[test]
    fn test_hydrate_marks_processed() {
        let dir = TempDir::new().unwrap();
        let mut first = session(&dir, SMALL);
        let mut store = MemoryStore::new();
        first
            .persist(
                &mut store,
                &ProgressSnapshot {
                    chunk_fraction: 0.0,
                    text_position: 0,
                },
            )
            .unwrap();

        let mut second = session(&dir, SMALL);
        assert!(!second.is_processed());
        second.hydrate(&store).unwrap();
        assert!(second.is_processed());
    }

    #[test]
    fn test_reconcile_snaps_outside_offset_to_section_start() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);

        let mut node = SectionNode::open_at(2000);
        node.finalize(5000);
        session.table_of_contents = CacheSlot::Loaded(vec![node]);
        session.current_section_id = Some("section2000".into());
        session.current_byte = Some(1500);

        session.reconcile();
        assert_eq!(session.current_byte, Some(2000));

        // Idempotent: a second run leaves the corrected offset alone.
        session.reconcile();
        assert_eq!(session.current_byte, Some(2000));
    }

    #[test]
    fn test_reconcile_unknown_id_leaves_offset() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);

        let mut node = SectionNode::open_at(2000);
        node.finalize(5000);
        session.table_of_contents = CacheSlot::Loaded(vec![node]);
        session.current_section_id = Some("section9999".into());
        session.current_byte = Some(1500);

        session.reconcile();
        assert_eq!(session.current_byte, Some(1500));
    }

    #[test]
    fn test_persist_inserts_then_updates() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, SMALL);
        let mut store = MemoryStore::new();

        session.read_next_chunk().unwrap();
        session
            .persist(
                &mut store,
                &ProgressSnapshot {
                    chunk_fraction: 0.0,
                    text_position: 0,
                },
            )
            .unwrap();

        let record = store.load(session.path()).unwrap();
        // Default title derives from the file stem.
        assert_eq!(record.title, "book");
        assert!(record.percentile >= 0.0 && record.percentile <= 1.0);

        session
            .persist(
                &mut store,
                &ProgressSnapshot {
                    chunk_fraction: 0.5,
                    text_position: 10,
                },
            )
            .unwrap();
        let record = store.load(session.path()).unwrap();
        assert_eq!(record.text_offset, 10);
    }

    #[test]
    fn test_percentile_empty_document_is_one() {
        assert_eq!(interpolate_percentile(0, 0, 0, 0.0), 1.0);
    }

    #[test]
    fn test_percentile_interpolates_between_boundaries() {
        // Halfway through a chunk spanning [1000, 3000) of a 10000-byte file.
        let p = interpolate_percentile(1000, 3000, 10_000, 0.5);
        assert!((p - 0.2).abs() < 1e-9);
        assert!(interpolate_percentile(1000, 3000, 10_000, 0.0) < p);
        assert!(interpolate_percentile(1000, 3000, 10_000, 1.0) > p);
    }
}
