//! FB2 tag names recognized by the parser and scanner.

/// Nestable structural unit; may contain a title and child sections.
pub const SECTION: &str = "section";

/// Title of the enclosing section.
pub const TITLE: &str = "title";

/// Document-level title inside `title-info`.
pub const BOOK_TITLE: &str = "book-title";

/// Cover page container inside `title-info`.
pub const COVER_PAGE: &str = "coverpage";

/// Base64-encoded binary payload (images).
pub const BINARY: &str = "binary";

/// Image reference tag (`<image l:href="#..."/>`).
pub const IMAGE: &str = "image";

/// Plain prose paragraph.
pub const PARAGRAPH: &str = "p";
