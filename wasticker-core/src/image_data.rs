//! Validated Image Data
//!
//! An `ImageData` only exists after every compliance rule passed; the
//! constructor is private to the crate and called by `Validator` alone.

use crate::format::ImageFormat;
use crate::hashing::sha256_hex;
use crate::limits::StickerRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    bytes: Vec<u8>,
    format: ImageFormat,
    role: StickerRole,
    width: u32,
    height: u32,
}

impl ImageData {
    pub(crate) fn new(
        bytes: Vec<u8>,
        format: ImageFormat,
        role: StickerRole,
        width: u32,
        height: u32,
    ) -> Self {
        Self { bytes, format, role, width, height }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn role(&self) -> StickerRole {
        self.role
    }

    pub fn is_tray(&self) -> bool {
        self.role.is_tray()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// SHA-256 of the bytes, lowercase hex
    pub fn digest(&self) -> String {
        sha256_hex(&self.bytes)
    }
}

impl AsRef<[u8]> for ImageData {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
