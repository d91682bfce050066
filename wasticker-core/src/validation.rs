//! Compliance Validation - Ordered Rules, First Failure Wins
//!
//! Each rule is an independent predicate over the candidate bytes and the
//! role's limits. The order of `Validator::new` fixes which error a caller
//! sees when several checks would fail.

use std::cell::OnceCell;
use std::io;
use thiserror::Error;
use tracing::debug;

use crate::bundle::{BundleError, ResourceBundle};
use crate::format::ImageFormat;
use crate::header::{read_header, HeaderError, ImageHeader};
use crate::image_data::ImageData;
use crate::limits::{ComplianceConfig, RoleLimits, StickerRole};

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("File not found: {name}")]
    FileNotFound { name: String },

    #[error("Failed to read {name}: {source}")]
    ResourceUnreadable {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Image too big: {size} bytes exceeds the {max} byte limit")]
    ImageTooBig { size: usize, max: usize },

    #[error("Incorrect image size: {width}x{height}, expected {required}x{required}")]
    IncorrectImageSize { width: u32, height: u32, required: u32 },

    #[error("Animated images are not supported")]
    AnimatedImagesNotSupported,

    #[error("Too many emojis: {count} exceeds the limit of {max}")]
    TooManyEmojis { count: usize, max: usize },

    #[error("No limits configured for {0} stickers")]
    LimitsNotConfigured(StickerRole),
}

impl ComplianceError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "file_not_found",
            Self::ResourceUnreadable { .. } => "resource_unreadable",
            Self::UnsupportedImageFormat(_) => "unsupported_image_format",
            Self::ImageTooBig { .. } => "image_too_big",
            Self::IncorrectImageSize { .. } => "incorrect_image_size",
            Self::AnimatedImagesNotSupported => "animated_images_not_supported",
            Self::TooManyEmojis { .. } => "too_many_emojis",
            Self::LimitsNotConfigured(_) => "limits_not_configured",
        }
    }
}

impl From<HeaderError> for ComplianceError {
    fn from(e: HeaderError) -> Self {
        Self::UnsupportedImageFormat(e.to_string())
    }
}

/// What the rules look at. The header is decoded at most once, on demand.
pub(crate) struct Candidate<'a> {
    pub bytes: &'a [u8],
    pub format: ImageFormat,
    pub emojis: &'a [String],
    header: OnceCell<Result<ImageHeader, HeaderError>>,
}

impl<'a> Candidate<'a> {
    pub(crate) fn new(bytes: &'a [u8], format: ImageFormat, emojis: &'a [String]) -> Self {
        Self { bytes, format, emojis, header: OnceCell::new() }
    }

    pub(crate) fn header(&self) -> Result<&ImageHeader, ComplianceError> {
        self.header
            .get_or_init(|| read_header(self.bytes, self.format))
            .as_ref()
            .map_err(|e| e.clone().into())
    }
}

pub(crate) trait ComplianceRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, input: &Candidate<'_>, limits: &RoleLimits) -> Result<(), ComplianceError>;
}

// --- Concrete Rules ---

pub(crate) struct SignatureRule;

impl ComplianceRule for SignatureRule {
    fn name(&self) -> &'static str { "signature" }

    fn check(&self, input: &Candidate<'_>, _limits: &RoleLimits) -> Result<(), ComplianceError> {
        match ImageFormat::detect(input.bytes) {
            None => Err(ComplianceError::UnsupportedImageFormat(
                "data is neither PNG nor WebP".to_string(),
            )),
            Some(detected) if detected != input.format => {
                Err(ComplianceError::UnsupportedImageFormat(format!(
                    "declared {} but data is {}",
                    input.format, detected
                )))
            }
            Some(_) => Ok(()),
        }
    }
}

pub(crate) struct ByteSizeRule;

impl ComplianceRule for ByteSizeRule {
    fn name(&self) -> &'static str { "byte_size" }

    fn check(&self, input: &Candidate<'_>, limits: &RoleLimits) -> Result<(), ComplianceError> {
        let size = input.bytes.len();
        if size > limits.max_bytes {
            return Err(ComplianceError::ImageTooBig { size, max: limits.max_bytes });
        }
        Ok(())
    }
}

pub(crate) struct DimensionRule;

impl ComplianceRule for DimensionRule {
    fn name(&self) -> &'static str { "dimensions" }

    fn check(&self, input: &Candidate<'_>, limits: &RoleLimits) -> Result<(), ComplianceError> {
        let header = input.header()?;
        let required = limits.dimension;
        if header.width != required || header.height != required {
            return Err(ComplianceError::IncorrectImageSize {
                width: header.width,
                height: header.height,
                required,
            });
        }
        Ok(())
    }
}

pub(crate) struct AnimationRule;

impl ComplianceRule for AnimationRule {
    fn name(&self) -> &'static str { "animation" }

    fn check(&self, input: &Candidate<'_>, _limits: &RoleLimits) -> Result<(), ComplianceError> {
        if input.format != ImageFormat::Webp {
            return Ok(());
        }
        if input.header()?.animated {
            return Err(ComplianceError::AnimatedImagesNotSupported);
        }
        Ok(())
    }
}

pub(crate) struct EmojiCountRule;

impl ComplianceRule for EmojiCountRule {
    fn name(&self) -> &'static str { "emoji_count" }

    fn check(&self, input: &Candidate<'_>, limits: &RoleLimits) -> Result<(), ComplianceError> {
        let count = input.emojis.len();
        if count > limits.max_emojis {
            return Err(ComplianceError::TooManyEmojis { count, max: limits.max_emojis });
        }
        Ok(())
    }
}

/// Runs the rules in order and builds `ImageData` from whatever passes.
pub struct Validator {
    config: ComplianceConfig,
    rules: Vec<Box<dyn ComplianceRule>>,
}

impl Validator {
    pub fn new(config: ComplianceConfig) -> Self {
        Self {
            config,
            rules: vec![
                Box::new(SignatureRule),
                Box::new(ByteSizeRule),
                Box::new(DimensionRule),
                Box::new(AnimationRule),
                Box::new(EmojiCountRule),
            ],
        }
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(
        &self,
        bytes: Vec<u8>,
        format: ImageFormat,
        role: StickerRole,
    ) -> Result<ImageData, ComplianceError> {
        self.validate_with_emojis(bytes, format, role, &[])
    }

    pub fn validate_with_emojis(
        &self,
        bytes: Vec<u8>,
        format: ImageFormat,
        role: StickerRole,
        emojis: &[String],
    ) -> Result<ImageData, ComplianceError> {
        let limits = self
            .config
            .limits_for(role)
            .ok_or(ComplianceError::LimitsNotConfigured(role))?;

        let candidate = Candidate::new(&bytes, format, emojis);
        for rule in &self.rules {
            if let Err(e) = rule.check(&candidate, limits) {
                debug!(rule = rule.name(), %role, code = e.code(), "sticker image rejected");
                return Err(e);
            }
        }
        let header = *candidate.header()?;

        debug!(%role, %format, size = bytes.len(), "sticker image accepted");
        Ok(ImageData::new(bytes, format, role, header.width, header.height))
    }

    /// Resolve `filename` through the bundle, infer the format from its
    /// extension, then validate. A missing resource fails before any byte
    /// is inspected.
    pub fn validate_file<B: ResourceBundle + ?Sized>(
        &self,
        bundle: &B,
        filename: &str,
        role: StickerRole,
        emojis: &[String],
    ) -> Result<ImageData, ComplianceError> {
        let bytes = bundle.load(filename).map_err(|e| match e {
            BundleError::NotFound(name) => ComplianceError::FileNotFound { name },
            BundleError::Io { name, source } => ComplianceError::ResourceUnreadable { name, source },
        })?;

        let format = ImageFormat::from_filename(filename).ok_or_else(|| {
            ComplianceError::UnsupportedImageFormat(format!(
                "{} must have a .png or .webp extension",
                filename
            ))
        })?;

        self.validate_with_emojis(bytes, format, role, emojis)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ComplianceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DirectoryBundle;
    use crate::header::fixtures::{png, webp_canvas_only, webp_extended, webp_lossy};
    use crate::limits::MESSAGE_MAX_BYTES;

    fn emojis(n: usize) -> Vec<String> {
        (0..n).map(|_| "😀".to_string()).collect()
    }

    #[test]
    fn rules_run_in_documented_order() {
        assert_eq!(
            Validator::default().rule_names(),
            vec!["signature", "byte_size", "dimensions", "animation", "emoji_count"]
        );
    }

    #[test]
    fn signature_checked_before_size() {
        let data = vec![0u8; MESSAGE_MAX_BYTES * 2];
        let err = Validator::default()
            .validate(data, ImageFormat::Png, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn declared_format_must_match_signature() {
        let err = Validator::default()
            .validate(png(512, 512, 0), ImageFormat::Webp, StickerRole::Message)
            .unwrap_err();
        assert_eq!(err.code(), "unsupported_image_format");
    }

    #[test]
    fn size_checked_before_dimensions() {
        let err = Validator::default()
            .validate(png(64, 64, MESSAGE_MAX_BYTES + 1), ImageFormat::Png, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::ImageTooBig { .. }));
    }

    #[test]
    fn dimensions_checked_before_animation() {
        let err = Validator::default()
            .validate(webp_extended(256, 256, 0x02, true, 0), ImageFormat::Webp, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(
            err,
            ComplianceError::IncorrectImageSize { width: 256, height: 256, required: 512 }
        ));
    }

    #[test]
    fn animation_checked_before_emojis() {
        let err = Validator::default()
            .validate_with_emojis(
                webp_extended(512, 512, 0x02, false, 0),
                ImageFormat::Webp,
                StickerRole::Message,
                &emojis(10),
            )
            .unwrap_err();
        assert!(matches!(err, ComplianceError::AnimatedImagesNotSupported));
    }

    #[test]
    fn too_many_emojis() {
        let validator = Validator::default();
        let ok = validator.validate_with_emojis(
            webp_lossy(512, 512, 0),
            ImageFormat::Webp,
            StickerRole::Message,
            &emojis(3),
        );
        assert!(ok.is_ok());

        let err = validator
            .validate_with_emojis(webp_lossy(512, 512, 0), ImageFormat::Webp, StickerRole::Message, &emojis(4))
            .unwrap_err();
        assert!(matches!(err, ComplianceError::TooManyEmojis { count: 4, max: 3 }));
    }

    #[test]
    fn non_square_png_rejected() {
        let err = Validator::default()
            .validate(png(512, 511, 0), ImageFormat::Png, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::IncorrectImageSize { width: 512, height: 511, .. }));
    }

    #[test]
    fn undecodable_header_is_unsupported_format() {
        let mut data = png(512, 512, 0);
        data[12..16].copy_from_slice(b"IDAT");
        let err = Validator::default()
            .validate(data, ImageFormat::Png, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn webp_canvas_without_bitstream_rejected() {
        let err = Validator::default()
            .validate(webp_canvas_only(512, 512), ImageFormat::Webp, StickerRole::Message)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::UnsupportedImageFormat(ref reason) if reason.contains("no image bitstream")));
    }

    #[test]
    fn still_webp_with_canvas_and_bitstream_accepted() {
        let image = Validator::default()
            .validate(webp_extended(512, 512, 0x10, false, 0), ImageFormat::Webp, StickerRole::Message)
            .unwrap();
        assert_eq!(image.dimensions(), (512, 512));
    }

    #[test]
    fn unreadable_resource_is_not_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x.png")).unwrap();

        let err = Validator::default()
            .validate_file(&DirectoryBundle::new(dir.path()), "x.png", StickerRole::Message, &[])
            .unwrap_err();
        assert!(matches!(err, ComplianceError::ResourceUnreadable { ref name, .. } if name == "x.png"));
        assert_eq!(err.code(), "resource_unreadable");
    }

    #[test]
    fn unconfigured_role_reported_before_signature() {
        let err = Validator::default()
            .validate(b"garbage".to_vec(), ImageFormat::Png, StickerRole::Tray)
            .unwrap_err();
        assert_eq!(err.code(), "limits_not_configured");
    }

    #[test]
    fn tray_requires_configuration() {
        let err = Validator::default()
            .validate(png(96, 96, 0), ImageFormat::Png, StickerRole::Tray)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::LimitsNotConfigured(StickerRole::Tray)));
    }

    #[test]
    fn tray_uses_its_own_limits() {
        let config = ComplianceConfig::new().with_tray(RoleLimits {
            max_bytes: 50 * 1024,
            dimension: 96,
            max_emojis: 0,
        });
        let validator = Validator::new(config);

        let tray = validator.validate(png(96, 96, 0), ImageFormat::Png, StickerRole::Tray).unwrap();
        assert!(tray.is_tray());
        assert_eq!(tray.dimensions(), (96, 96));

        let err = validator
            .validate(png(512, 512, 0), ImageFormat::Png, StickerRole::Tray)
            .unwrap_err();
        assert!(matches!(err, ComplianceError::IncorrectImageSize { required: 96, .. }));
    }
}
