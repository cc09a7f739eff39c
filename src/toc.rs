//! Table-of-contents tree built by the structural scan.
//!
//! Sections nest in document order. A node's identity is a deterministic
//! function of its start offset, assigned when the section is exited, so
//! ids are unique within a document (offsets strictly increase).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Derive the unique section id for a section starting at `offset`.
pub fn section_id(offset: u64) -> String {
    format!("section{offset}")
}

/// A section of the document: a nestable structural unit delimited by
/// matching enter/exit markers, possibly carrying a title and children.
///
/// `document_path` is deliberately not serialized — the cache file name
/// already encodes the document — and is restored by
/// [`attach_path`](Self::attach_path) after deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    /// `"section" + start_offset`, assigned at section exit.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub start_offset: u64,
    /// Set only once the matching exit marker is seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionNode>,
    /// Back-reference to the source file, set on hydration.
    #[serde(skip)]
    pub document_path: Option<PathBuf>,
}

impl SectionNode {
    /// Create an open node at the offset where its enter marker was seen.
    pub fn open_at(start_offset: u64) -> Self {
        SectionNode {
            id: String::new(),
            title: None,
            start_offset,
            end_offset: None,
            children: Vec::new(),
            document_path: None,
        }
    }

    /// Finalize the node at its exit marker: assign the offset-derived id
    /// and the end offset.
    pub fn finalize(&mut self, end_offset: u64) {
        self.id = section_id(self.start_offset);
        self.end_offset = Some(end_offset);
    }

    /// Accumulate a title fragment; repeated fragments join with `", "`.
    pub fn push_title_fragment(&mut self, fragment: &str) {
        match &mut self.title {
            Some(title) => {
                title.push_str(", ");
                title.push_str(fragment);
            }
            None => self.title = Some(fragment.to_string()),
        }
    }

    /// True if `offset` falls within this node's finalized span.
    pub fn contains_offset(&self, offset: u64) -> bool {
        match self.end_offset {
            Some(end) => offset >= self.start_offset && offset <= end,
            None => false,
        }
    }

    /// Patch `document_path` across the whole subtree. Must run after
    /// loading a cached tree, before nodes are used for anything
    /// path-dependent.
    pub fn attach_path(&mut self, path: &Path) {
        self.document_path = Some(path.to_path_buf());
        for child in &mut self.children {
            child.attach_path(path);
        }
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SectionNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Flatten a forest of sections into all nodes, any depth, document order.
pub fn flatten(nodes: &[SectionNode]) -> Vec<&SectionNode> {
    let mut out = Vec::new();
    for node in nodes {
        node.visit(&mut |n| out.push(n));
    }
    out
}

/// Extract the flat id→title mapping (titled nodes only, any depth).
pub fn id_title_map(nodes: &[SectionNode]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for node in flatten(nodes) {
        if let Some(title) = &node.title {
            map.insert(node.id.clone(), title.clone());
        }
    }
    map
}
