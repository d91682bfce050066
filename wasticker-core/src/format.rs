//! Image Formats - Signature Detection
//!
//! Only PNG and WebP are accepted for stickers. The byte signature is the
//! authority; extensions and declared formats must agree with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading bytes. Returns `None` for anything
    /// that is neither PNG nor a RIFF/WEBP container.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() >= PNG_SIGNATURE.len() && data[..8] == PNG_SIGNATURE {
            return Some(Self::Png);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        None
    }

    /// Map a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Map a file name by its extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
