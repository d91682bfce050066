//! Resource Bundles - Name To Bytes
//!
//! The validator resolves sticker files through this trait so it never
//! touches the platform's own bundle APIs.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::ImageFormat;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to read resource {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub trait ResourceBundle: Send + Sync {
    /// Load the full contents of the named resource.
    fn load(&self, name: &str) -> Result<Vec<u8>, BundleError>;

    /// Names of resources that look like sticker images, sorted.
    fn list_images(&self) -> Result<Vec<String>, BundleError>;
}

/// Plain file names inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        // no nested paths or escapes out of the root
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl ResourceBundle for DirectoryBundle {
    fn load(&self, name: &str) -> Result<Vec<u8>, BundleError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| BundleError::NotFound(name.to_string()))?;

        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BundleError::NotFound(name.to_string()))
            }
            Err(source) => Err(BundleError::Io { name: name.to_string(), source }),
        }
    }

    fn list_images(&self) -> Result<Vec<String>, BundleError> {
        let io_err = |source| BundleError::Io {
            name: self.root.display().to_string(),
            source,
        };

        let mut names = vec![];
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if ImageFormat::from_filename(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory bundle, e.g. for assets compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.resources.insert(name.into(), data);
    }

    pub fn with(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }
}

impl ResourceBundle for MemoryBundle {
    fn load(&self, name: &str) -> Result<Vec<u8>, BundleError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| BundleError::NotFound(name.to_string()))
    }

    fn list_images(&self) -> Result<Vec<String>, BundleError> {
        let mut names: Vec<_> = self
            .resources
            .keys()
            .filter(|n| ImageFormat::from_filename(n).is_some())
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}
