//! On-disk caches derived by the structural scan.
//!
//! One pair of JSON files per document, named from the document's base
//! filename, plus the extracted cover image named from a stable hash of
//! the document path:
//!
//! - `<basename>_TOC.json` — serialized [`SectionNode`] forest
//! - `<basename>_id_title_map.json` — flat id→title mapping
//! - `<sha1(path)>.<ext>` — raw cover bytes

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::cover;
use crate::error::{Error, Result};
use crate::toc::SectionNode;

/// Directory holding all derived caches.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CacheDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn basename(document: &Path) -> String {
        document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Stable per-document identity for files that cannot embed the
    /// document basename (the cover image).
    fn document_digest(document: &Path) -> String {
        let mut sha = sha1_smol::Sha1::new();
        sha.update(document.to_string_lossy().as_bytes());
        sha.digest().to_string()
    }

    pub fn toc_path(&self, document: &Path) -> PathBuf {
        self.root
            .join(format!("{}_TOC.json", Self::basename(document)))
    }

    pub fn id_title_map_path(&self, document: &Path) -> PathBuf {
        self.root
            .join(format!("{}_id_title_map.json", Self::basename(document)))
    }

    pub fn cover_path(&self, document: &Path, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", Self::document_digest(document), extension))
    }

    pub fn has_toc(&self, document: &Path) -> bool {
        self.toc_path(document).exists()
    }

    pub fn has_id_title_map(&self, document: &Path) -> bool {
        self.id_title_map_path(document).exists()
    }

    /// Serialize the TOC forest. The document path is intentionally not
    /// part of the format; the file name already encodes the document.
    pub fn write_toc(&self, document: &Path, toc: &[SectionNode]) -> Result<()> {
        let path = self.toc_path(document);
        self.write_json(&path, toc)?;
        debug!("stored TOC cache at {}", path.display());
        Ok(())
    }

    /// Load a cached TOC and patch every node's `document_path` back to
    /// the currently open document before returning it.
    pub fn read_toc(&self, document: &Path) -> Result<Vec<SectionNode>> {
        let file = File::open(self.toc_path(document))?;
        let mut toc: Vec<SectionNode> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Cache(format!("corrupt TOC cache: {e}")))?;
        for node in &mut toc {
            node.attach_path(document);
        }
        Ok(toc)
    }

    pub fn write_id_title_map(
        &self,
        document: &Path,
        map: &HashMap<String, String>,
    ) -> Result<()> {
        let path = self.id_title_map_path(document);
        self.write_json(&path, map)?;
        debug!("stored id/title cache at {}", path.display());
        Ok(())
    }

    pub fn read_id_title_map(&self, document: &Path) -> Result<HashMap<String, String>> {
        let file = File::open(self.id_title_map_path(document))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Cache(format!("corrupt id/title cache: {e}")))
    }

    /// Write raw cover bytes, choosing the extension from the image's
    /// magic bytes. Returns the path of the created file.
    pub fn write_cover(&self, document: &Path, data: &[u8]) -> Result<PathBuf> {
        let extension = cover::detect_format(data).extension();
        let path = self.cover_path(document, extension);
        fs::create_dir_all(&self.root)?;
        let mut file = File::create(&path)?;
        file.write_all(data)?;
        debug!("stored cover image at {}", path.display());
        Ok(path)
    }

    // `?Sized` so slices serialize without an intermediate Vec.
    fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)
            .map_err(|e| Error::Cache(format!("cache serialization failed: {e}")))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_toc() -> Vec<SectionNode> {
        let mut child = SectionNode::open_at(2000);
        child.push_title_fragment("Nested");
        child.finalize(5000);
        let mut root = SectionNode::open_at(0);
        root.push_title_fragment("Root");
        root.children.push(child);
        root.finalize(9000);
        vec![root]
    }

    #[test]
    fn test_cache_file_naming() {
        let cache = CacheDir::new("/tmp/folio");
        let doc = Path::new("/books/war and peace.fb2");
        assert!(
            cache
                .toc_path(doc)
                .ends_with("war and peace.fb2_TOC.json")
        );
        assert!(
            cache
                .id_title_map_path(doc)
                .ends_with("war and peace.fb2_id_title_map.json")
        );
    }

    #[test]
    fn test_cover_name_is_stable_per_document() {
        let cache = CacheDir::new("/tmp/folio");
        let a = cache.cover_path(Path::new("/books/a.fb2"), "jpg");
        let b = cache.cover_path(Path::new("/books/b.fb2"), "jpg");
        assert_ne!(a, b);
        assert_eq!(a, cache.cover_path(Path::new("/books/a.fb2"), "jpg"));
    }

    #[test]
    fn test_toc_roundtrip_patches_path() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path());
        let doc = Path::new("/books/a.fb2");

        let toc = sample_toc();
        cache.write_toc(doc, &toc).unwrap();
        assert!(cache.has_toc(doc));

        let restored = cache.read_toc(doc).unwrap();
        assert_eq!(restored[0].id, "section0");
        assert_eq!(restored[0].children[0].id, "section2000");
        assert_eq!(restored[0].document_path.as_deref(), Some(doc));
        assert_eq!(restored[0].children[0].document_path.as_deref(), Some(doc));
    }

    #[test]
    fn test_id_title_map_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path());
        let doc = Path::new("/books/a.fb2");

        let map = crate::toc::id_title_map(&sample_toc());
        cache.write_id_title_map(doc, &map).unwrap();
        let restored = cache.read_id_title_map(doc).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_write_cover_sniffs_extension() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path());
        let doc = Path::new("/books/a.fb2");

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
        let path = cache.write_cover(doc, &png).unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(fs::read(&path).unwrap(), png);
    }

    #[test]
    fn test_missing_cache_is_io_error() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path());
        assert!(matches!(
            cache.read_toc(Path::new("/books/none.fb2")),
            Err(Error::Io(_))
        ));
    }
}
