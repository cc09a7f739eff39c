//! Cover-image payload handling: base64 decoding and container sniffing.
//!
//! Decoding the pixel data and sampling a dominant color are the job of an
//! external collaborator ([`ColorSampler`]); the core only materializes the
//! raw bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Image container detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Jpeg,
    Png,
    Gif,
    /// Unrecognized container; stored with a neutral extension.
    Unknown,
}

impl CoverFormat {
    /// File extension used for the on-disk cover cache.
    pub fn extension(self) -> &'static str {
        match self {
            CoverFormat::Jpeg => "jpg",
            CoverFormat::Png => "png",
            CoverFormat::Gif => "gif",
            CoverFormat::Unknown => "bin",
        }
    }
}

/// Detect the image container from leading magic bytes.
pub fn detect_format(data: &[u8]) -> CoverFormat {
    if data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
        CoverFormat::Png
    } else if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
        CoverFormat::Jpeg
    } else if data.len() >= 3 && data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
        CoverFormat::Gif
    } else {
        CoverFormat::Unknown
    }
}

/// Decode an FB2 binary payload. FB2 base64 blocks are line-wrapped, so
/// ASCII whitespace is stripped before decoding.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::Malformed(format!("invalid cover base64: {e}")))
}

/// Collaborator that derives a representative color from raw image bytes.
///
/// Bitmap decoding and color sampling live outside the core; embedders
/// plug in their own implementation.
pub trait ColorSampler {
    /// `0x00RRGGBB` representative color, or `None` if the bytes cannot
    /// be sampled.
    fn dominant_color(&self, data: &[u8]) -> Option<u32>;
}

/// Default sampler: never produces a color.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSampler;

impl ColorSampler for NoSampler {
    fn dominant_color(&self, _data: &[u8]) -> Option<u32> {
        None
    }
}
