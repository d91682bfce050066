//! Sticker Entity
//!
//! One in-chat sticker: validated image data plus its emojis. Construction
//! goes through the validator, so a `Sticker` is always compliant.

use tracing::debug;

use crate::bundle::ResourceBundle;
use crate::clipboard::{ClipboardError, ClipboardWriter};
use crate::format::ImageFormat;
use crate::image_data::ImageData;
use crate::limits::StickerRole;
use crate::validation::{ComplianceError, Validator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    image_data: ImageData,
    emojis: Vec<String>,
}

impl Sticker {
    /// Load `filename` (with a `.png` or `.webp` extension) from the bundle.
    pub fn from_file<B: ResourceBundle + ?Sized>(
        validator: &Validator,
        bundle: &B,
        filename: &str,
        emojis: Vec<String>,
    ) -> Result<Self, ComplianceError> {
        let image_data = validator.validate_file(bundle, filename, StickerRole::Message, &emojis)?;
        Ok(Self { image_data, emojis })
    }

    pub fn from_data(
        validator: &Validator,
        data: Vec<u8>,
        format: ImageFormat,
        emojis: Vec<String>,
    ) -> Result<Self, ComplianceError> {
        let image_data =
            validator.validate_with_emojis(data, format, StickerRole::Message, &emojis)?;
        Ok(Self { image_data, emojis })
    }

    pub fn image_data(&self) -> &ImageData {
        &self.image_data
    }

    pub fn emojis(&self) -> &[String] {
        &self.emojis
    }

    pub fn byte_size(&self) -> usize {
        self.image_data.byte_size()
    }

    pub fn copy_to_clipboard(&self, clipboard: &dyn ClipboardWriter) -> Result<(), ClipboardError> {
        debug!(format = %self.image_data.format(), size = self.byte_size(), "copying sticker to clipboard");
        clipboard.write_image(self.image_data.bytes(), self.image_data.format())
    }
}
