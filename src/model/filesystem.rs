//! Filesystem image store.
//!
//! Identifiers map to `<root>/<identifier>.<ext>`, trying each configured
//! extension in order. Identifiers that could step outside the root are
//! reported as misses.

use super::{ImageStore, StoreError};
use crate::config::ConfigError;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct FileStore {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FileStore {
    /// Create a store over `root`, which must be an existing directory.
    pub fn new(root: &Path, extensions: &[String]) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "image root {} is not a directory",
                root.display()
            )));
        }
        if extensions.is_empty() {
            return Err(ConfigError::Validation(format!(
                "image root {} has no extensions to look up",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
            extensions: extensions.to_vec(),
        })
    }
}

fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && !identifier.starts_with('.')
        && !identifier.contains(['/', '\\', '\0'])
}

impl ImageStore for FileStore {
    fn find(&self, identifier: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_identifier(identifier) {
            warn!(identifier, "refusing identifier outside the image root");
            return Err(StoreError::NotFound(identifier.to_string()));
        }

        for ext in &self.extensions {
            let candidate = self.root.join(format!("{identifier}.{ext}"));
            match candidate.metadata() {
                Ok(meta) if meta.is_file() => return Ok(candidate),
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Io(e)),
            }
        }
        Err(StoreError::NotFound(identifier.to_string()))
    }
}
