//! Compliance Reports - Serializable Outcomes
//!
//! One report per checked resource; a scan checks every image a bundle
//! lists. The scan hash covers outcomes and digests but not timestamps, so
//! re-scanning unchanged files yields the same hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bundle::{BundleError, ResourceBundle};
use crate::format::ImageFormat;
use crate::hashing::json_digest;
use crate::image_data::ImageData;
use crate::limits::StickerRole;
use crate::validation::{ComplianceError, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub name: String,
    pub role: StickerRole,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ComplianceReport {
    pub fn from_outcome(
        name: &str,
        role: StickerRole,
        outcome: &Result<ImageData, ComplianceError>,
    ) -> Self {
        let mut report = Self {
            name: name.to_string(),
            role,
            valid: outcome.is_ok(),
            error_code: None,
            error: None,
            format: None,
            byte_size: None,
            width: None,
            height: None,
            digest: None,
            checked_at: Utc::now(),
        };

        match outcome {
            Ok(data) => {
                let (width, height) = data.dimensions();
                report.format = Some(data.format());
                report.byte_size = Some(data.byte_size());
                report.width = Some(width);
                report.height = Some(height);
                report.digest = Some(data.digest());
            }
            Err(e) => {
                report.error_code = Some(e.code().to_string());
                report.error = Some(e.to_string());
            }
        }

        report
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub engine_version: String,
    pub role: StickerRole,
    pub total: usize,
    pub compliant: usize,
    pub scan_hash: String,
    pub reports: Vec<ComplianceReport>,
}

impl ScanSummary {
    pub fn all_compliant(&self) -> bool {
        self.compliant == self.total
    }
}

#[derive(Serialize)]
struct HashedOutcome<'a> {
    name: &'a str,
    valid: bool,
    error_code: Option<&'a str>,
    digest: Option<&'a str>,
}

pub fn check_file<B: ResourceBundle + ?Sized>(
    validator: &Validator,
    bundle: &B,
    name: &str,
    role: StickerRole,
    emojis: &[String],
) -> ComplianceReport {
    let outcome = validator.validate_file(bundle, name, role, emojis);
    if let Err(e @ ComplianceError::ResourceUnreadable { .. }) = &outcome {
        warn!(name, error = %e, "sticker resource unreadable");
    }
    ComplianceReport::from_outcome(name, role, &outcome)
}

/// Check every image the bundle lists, in name order.
pub fn scan_bundle<B: ResourceBundle + ?Sized>(
    validator: &Validator,
    bundle: &B,
    role: StickerRole,
) -> Result<ScanSummary, BundleError> {
    let reports: Vec<_> = bundle
        .list_images()?
        .iter()
        .map(|name| check_file(validator, bundle, name, role, &[]))
        .collect();

    let hashed: Vec<_> = reports
        .iter()
        .map(|r| HashedOutcome {
            name: &r.name,
            valid: r.valid,
            error_code: r.error_code.as_deref(),
            digest: r.digest.as_deref(),
        })
        .collect();
    // serializing plain strings and bools cannot fail
    let scan_hash = json_digest(&hashed).unwrap_or_default();

    let compliant = reports.iter().filter(|r| r.valid).count();
    info!(%role, total = reports.len(), compliant, "bundle scan finished");

    Ok(ScanSummary {
        engine_version: ENGINE_VERSION.to_string(),
        role,
        total: reports.len(),
        compliant,
        scan_hash,
        reports,
    })
}
