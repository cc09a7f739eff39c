//! Encoding detection and text decoding helpers.

use std::borrow::Cow;

use encoding_rs::Encoding;
use memchr::memmem;

/// Detect the character encoding of a document from a leading byte sample.
///
/// Detection order:
/// 1. Byte-order mark (via encoding_rs).
/// 2. The `encoding` pseudo-attribute of the XML declaration.
/// 3. `None` (callers fall back to UTF-8).
///
/// The sample only needs to cover the XML declaration; 1 KiB is plenty.
pub fn detect_encoding(sample: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
        return Some(encoding);
    }
    declared_encoding(sample)
}

/// Extract the encoding label from an XML declaration, if present.
fn declared_encoding(sample: &[u8]) -> Option<&'static Encoding> {
    if !sample.starts_with(b"<?xml") {
        return None;
    }
    // Only look inside the declaration itself.
    let end = memchr::memchr(b'>', sample).unwrap_or(sample.len());
    let decl = &sample[..end];

    let at = memmem::find(decl, b"encoding")?;
    let rest = &decl[at + b"encoding".len()..];
    let eq = memchr::memchr(b'=', rest)?;
    let rest = rest[eq + 1..].trim_ascii_start();
    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = memchr::memchr(quote, &rest[1..])?;
    Encoding::for_label(&rest[1..1 + close])
}

/// Decode bytes to a string using the detected document encoding.
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
/// Malformed sequences are replaced rather than rejected; a byte-offset
/// oriented reader must keep moving past stray bytes.
pub fn decode_text<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (result, _, _) = encoding.decode(bytes);
    result
}
