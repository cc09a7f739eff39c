//! # folio
//!
//! A streaming, resumable parser and reading-session library for FB2
//! (FictionBook 2) e-books.
//!
//! ## Features
//!
//! - Pull-based XML event stream with byte-offset tracking
//! - Bounded-size text chunks for display, with one-ahead prefetch
//! - Full structural scan: table of contents, title, cover image
//! - On-disk caches for derived structures (JSON)
//! - Resume at an exact byte offset across process restarts, with
//!   position-integrity reconciliation against the table of contents
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{BookSession, CacheDir, MemoryStore, ProgressSnapshot};
//!
//! let mut store = MemoryStore::new();
//! let cache = CacheDir::new("/tmp/folio-cache");
//!
//! let mut session = BookSession::open("book.fb2", cache).unwrap();
//! if folio::store::is_fully_processed(&store, session.path()) {
//!     session.hydrate(&store).unwrap();
//! } else {
//!     session.scan_full_structure().unwrap();
//! }
//!
//! while session.has_more() {
//!     let block = session.read_next_chunk().unwrap();
//!     println!("{}", block.text);
//!     session.advance();
//! }
//!
//! let snapshot = ProgressSnapshot { chunk_fraction: 0.0, text_position: 0 };
//! session.persist(&mut store, &snapshot).unwrap();
//! session.close();
//! ```

pub mod cache;
pub mod chunks;
pub mod cover;
pub mod error;
pub mod parser;
pub mod scan;
pub mod session;
pub mod store;
pub mod toc;
pub(crate) mod util;

pub use cache::CacheDir;
pub use chunks::{CHUNK_SIZE, ChunkInfo, TextBlock};
pub use cover::{ColorSampler, CoverFormat, NoSampler};
pub use error::{Error, Result};
pub use parser::{EventReader, XmlEvent, XmlEventKind};
pub use scan::{CoverPayload, ScanOutcome};
pub use session::{BookSession, ProgressSnapshot, interpolate_percentile};
pub use store::{BookRecord, MemoryStore, RecordPatch, RecordStore};
pub use toc::{SectionNode, section_id};
