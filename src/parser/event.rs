//! Parse events produced by [`EventReader`](super::EventReader).

/// What the parser saw at a given point in the byte stream.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEventKind {
    /// An opening tag with its attributes. Self-closing tags produce an
    /// `EnterTag` immediately followed by a matching [`ExitTag`](Self::ExitTag).
    EnterTag {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// A closing tag.
    ExitTag { name: String },
    /// Character data. `tag` is the name of the innermost open tag,
    /// which acts as the content type (`p` marks plain prose).
    Content { tag: String, text: String },
    /// End of the document stream.
    DocumentEnd,
}

/// A single parse event plus the byte offset at which it was produced
/// (the offset of the next unread byte once the event was consumed).
#[derive(Debug, Clone, PartialEq)]
pub struct XmlEvent {
    pub kind: XmlEventKind,
    pub offset: u64,
}

impl XmlEvent {
    /// True if this event opens the given tag.
    pub fn entering(&self, tag: &str) -> bool {
        matches!(&self.kind, XmlEventKind::EnterTag { name, .. } if name == tag)
    }

    /// True if this event closes the given tag.
    pub fn exiting(&self, tag: &str) -> bool {
        matches!(&self.kind, XmlEventKind::ExitTag { name } if name == tag)
    }

    /// True if this is the terminal event of the stream.
    pub fn is_document_end(&self) -> bool {
        matches!(self.kind, XmlEventKind::DocumentEnd)
    }

    /// Content text if this is a content event inside the given tag.
    pub fn content_of(&self, tag: &str) -> Option<&str> {
        match &self.kind {
            XmlEventKind::Content { tag: t, text } if t == tag => Some(text),
            _ => None,
        }
    }

    /// Value of the named attribute on an `EnterTag` event.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match &self.kind {
            XmlEventKind::EnterTag { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Value of the first attribute whose key contains `fragment`.
    /// FB2 href attributes are namespaced (`l:href`, `xlink:href`), so
    /// lookups match on the local part.
    pub fn attr_containing(&self, fragment: &str) -> Option<&str> {
        match &self.kind {
            XmlEventKind::EnterTag { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.contains(fragment))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}
