//! WhatsApp Sticker Core - Image Compliance
//!
//! # Guarantees
//! 1. Construction Is Validation: an `ImageData` only exists once every check passed
//! 2. Checks Run In A Fixed Order: the first failure is the one reported
//! 3. Thresholds Are Configuration, selected by role
//! 4. Platform Glue Is Injected: bundles and clipboards are traits

pub mod format;
pub mod header;
pub mod limits;
pub mod validation;
pub mod image_data;
pub mod bundle;
pub mod clipboard;
pub mod sticker;
pub mod hashing;
pub mod report;

pub use format::ImageFormat;
pub use header::{HeaderError, ImageHeader};
pub use limits::{ComplianceConfig, ConfigError, RoleLimits, StickerRole};
pub use validation::{ComplianceError, Validator};
pub use image_data::ImageData;
pub use bundle::{BundleError, DirectoryBundle, MemoryBundle, ResourceBundle};
pub use clipboard::{ClipboardError, ClipboardWriter, MemoryClipboard};
pub use sticker::Sticker;
pub use hashing::sha256_hex;
pub use report::{ComplianceReport, ScanSummary, check_file, scan_bundle};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
