//! Role Limits - Thresholds As Configuration
//!
//! Message stickers and tray icons are checked against different limits.
//! Each role gets one `RoleLimits` record; rules never branch on the role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Message stickers may not exceed 100 KB.
pub const MESSAGE_MAX_BYTES: usize = 100 * 1024;
pub const MESSAGE_DIMENSION: u32 = 512;
pub const DEFAULT_MAX_EMOJIS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerRole {
    /// In-chat sticker
    Message,
    /// Pack icon shown in the sticker tray
    Tray,
}

impl StickerRole {
    pub fn is_tray(&self) -> bool {
        matches!(self, Self::Tray)
    }
}

impl fmt::Display for StickerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message => f.write_str("message"),
            Self::Tray => f.write_str("tray"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleLimits {
    /// Inclusive byte ceiling
    pub max_bytes: usize,
    /// Required width and height in pixels
    pub dimension: u32,
    #[serde(default = "default_max_emojis")]
    pub max_emojis: usize,
}

fn default_max_emojis() -> usize { DEFAULT_MAX_EMOJIS }

impl RoleLimits {
    pub fn message() -> Self {
        Self {
            max_bytes: MESSAGE_MAX_BYTES,
            dimension: MESSAGE_DIMENSION,
            max_emojis: DEFAULT_MAX_EMOJIS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {role} limits: {reason}")]
    Invalid { role: StickerRole, reason: &'static str },
}

/// Limits for every role.
///
/// Tray limits have no built-in values and must be supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceConfig {
    #[serde(default = "RoleLimits::message")]
    pub message: RoleLimits,
    #[serde(default)]
    pub tray: Option<RoleLimits>,
}

impl ComplianceConfig {
    /// Message defaults, tray unconfigured.
    pub fn new() -> Self {
        Self {
            message: RoleLimits::message(),
            tray: None,
        }
    }

    pub fn with_tray(mut self, tray: RoleLimits) -> Self {
        self.tray = Some(tray);
        self
    }

    pub fn with_message(mut self, message: RoleLimits) -> Self {
        self.message = message;
        self
    }

    pub fn limits_for(&self, role: StickerRole) -> Option<&RoleLimits> {
        match role {
            StickerRole::Message => Some(&self.message),
            StickerRole::Tray => self.tray.as_ref(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_limits(StickerRole::Message, &self.message)?;
        if let Some(tray) = &self.tray {
            check_limits(StickerRole::Tray, tray)?;
        }
        Ok(())
    }
}

fn check_limits(role: StickerRole, limits: &RoleLimits) -> Result<(), ConfigError> {
    if limits.max_bytes == 0 {
        return Err(ConfigError::Invalid { role, reason: "maxBytes must be positive" });
    }
    if limits.dimension == 0 {
        return Err(ConfigError::Invalid { role, reason: "dimension must be positive" });
    }
    Ok(())
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self::new()
    }
}
