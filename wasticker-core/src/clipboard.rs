//! Clipboard Capability
//!
//! Copying a sticker to the system pasteboard is platform glue. Hosts inject
//! a `ClipboardWriter`; the core never links a GUI toolkit.

use std::sync::Mutex;
use thiserror::Error;

use crate::format::ImageFormat;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait ClipboardWriter: Send + Sync {
    fn write_image(&self, bytes: &[u8], format: ImageFormat) -> Result<(), ClipboardError>;
}

/// Keeps the last written image in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<(Vec<u8>, ImageFormat)>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<(Vec<u8>, ImageFormat)> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_image(&self, bytes: &[u8], format: ImageFormat) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))?;
        *contents = Some((bytes.to_vec(), format));
        Ok(())
    }
}
