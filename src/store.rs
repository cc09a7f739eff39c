//! Persistence boundary: an opaque record store keyed by document path.
//!
//! The store holds scalar position fields only, never the parsed tree.
//! Embedders back this with whatever database they have;
//! [`MemoryStore`] is the reference implementation used by tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Scalar reading state persisted per document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookRecord {
    pub path: PathBuf,
    pub title: String,
    /// Logical position within the flattened text stream.
    pub text_offset: usize,
    /// Opaque caller-supplied timestamp; the session never interprets it.
    pub time_opened: Option<String>,
    /// Fractional read progress in `[0, 1]`.
    pub percentile: f64,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
    /// Resume offset: where normal reading continues next session.
    pub byte_position: u64,
    pub fully_processed: bool,
    pub fully_processing_success: Option<bool>,
    pub cover_path: Option<PathBuf>,
    /// Representative cover color as `0x00RRGGBB`.
    pub cover_color: Option<u32>,
}

/// Partial update: only fields that are semantically valid to write are
/// set; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub text_offset: Option<usize>,
    pub time_opened: Option<String>,
    pub percentile: Option<f64>,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
    pub byte_position: Option<u64>,
    pub fully_processed: Option<bool>,
    pub fully_processing_success: Option<bool>,
    pub cover_path: Option<PathBuf>,
    pub cover_color: Option<u32>,
}

/// Opaque key-value record store, keyed by document path.
pub trait RecordStore {
    fn exists(&self, path: &Path) -> bool;
    fn load(&self, path: &Path) -> Option<BookRecord>;
    fn insert(&mut self, record: BookRecord);
    fn update(&mut self, path: &Path, patch: RecordPatch);
}

/// Check whether a document has been fully processed, without opening a
/// session for it.
pub fn is_fully_processed(store: &dyn RecordStore, path: &Path) -> bool {
    store.load(path).is_some_and(|r| r.fully_processed)
}

/// In-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<PathBuf, BookRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    fn load(&self, path: &Path) -> Option<BookRecord> {
        self.records.get(path).cloned()
    }

    fn insert(&mut self, record: BookRecord) {
        self.records.insert(record.path.clone(), record);
    }

    fn update(&mut self, path: &Path, patch: RecordPatch) {
        let Some(record) = self.records.get_mut(path) else {
            return;
        };
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(text_offset) = patch.text_offset {
            record.text_offset = text_offset;
        }
        if let Some(time_opened) = patch.time_opened {
            record.time_opened = Some(time_opened);
        }
        if let Some(percentile) = patch.percentile {
            record.percentile = percentile;
        }
        if let Some(section_id) = patch.section_id {
            record.section_id = Some(section_id);
        }
        if let Some(section_title) = patch.section_title {
            record.section_title = Some(section_title);
        }
        if let Some(byte_position) = patch.byte_position {
            record.byte_position = byte_position;
        }
        if let Some(fully_processed) = patch.fully_processed {
            record.fully_processed = fully_processed;
        }
        if let Some(success) = patch.fully_processing_success {
            record.fully_processing_success = Some(success);
        }
        if let Some(cover_path) = patch.cover_path {
            record.cover_path = Some(cover_path);
        }
        if let Some(cover_color) = patch.cover_color {
            record.cover_color = Some(cover_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> BookRecord {
        BookRecord {
            path: PathBuf::from(path),
            title: "A Book".into(),
            percentile: 0.25,
            byte_position: 1000,
            section_id: Some("section100".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_then_exists_and_load() {
        let mut store = MemoryStore::new();
        let path = Path::new("/books/a.fb2");
        assert!(!store.exists(path));
        assert!(store.load(path).is_none());

        store.insert(record("/books/a.fb2"));
        assert!(store.exists(path));
        assert_eq!(store.load(path).unwrap().byte_position, 1000);
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut store = MemoryStore::new();
        store.insert(record("/books/a.fb2"));

        store.update(
            Path::new("/books/a.fb2"),
            RecordPatch {
                percentile: Some(0.5),
                ..Default::default()
            },
        );

        let loaded = store.load(Path::new("/books/a.fb2")).unwrap();
        assert_eq!(loaded.percentile, 0.5);
        assert_eq!(loaded.title, "A Book");
        assert_eq!(loaded.section_id.as_deref(), Some("section100"));
    }

    #[test]
    fn test_update_unknown_path_is_noop() {
        let mut store = MemoryStore::new();
        store.update(Path::new("/books/none.fb2"), RecordPatch::default());
        assert!(!store.exists(Path::new("/books/none.fb2")));
    }

    #[test]
    fn test_is_fully_processed() {
        let mut store = MemoryStore::new();
        assert!(!is_fully_processed(&store, Path::new("/books/a.fb2")));
        let mut rec = record("/books/a.fb2");
        rec.fully_processed = true;
        store.insert(rec);
        assert!(is_fully_processed(&store, Path::new("/books/a.fb2")));
    }
}
