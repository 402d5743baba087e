//! Server configuration module.
//!
//! Handles loading and validating `iiif.toml`. Every option has a default
//! except the not-found image, which must point at an existing file: the
//! server refuses to start without it rather than failing per request.
//!
//! ## Configuration Options
//!
//! ```toml
//! bind = "127.0.0.1:8182"          # Listen address
//! # base_url = "https://images.example.org/iiif"  # Public prefix for info.json @id
//! not_found_image = "not-found.png" # Served (404/401) in place of missing or denied images
//!
//! [cache]
//! expires_seconds = 31536000        # Cache-Control max-age on successful responses
//! public = false                    # public or private Cache-Control
//!
//! [models.image]                    # One table per `{model}` path segment
//! kind = "filesystem"
//! root = "images"                   # <root>/<identifier>.<ext>
//! extensions = ["png", "jpg", "jpeg", "tif", "tiff"]
//! output_formats = ["jpg", "png"]   # Declared in info.json, accepted on requests
//! denied = []                       # Identifiers refused with 401
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration loaded from `iiif.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: SocketAddr,
    /// Public URL prefix used to build `@id`. When absent, the request's
    /// `Host` header is used.
    pub base_url: Option<String>,
    /// Image served in place of missing or denied images. Required.
    pub not_found_image: Option<PathBuf>,
    /// Cache-Control settings for successful responses.
    pub cache: CacheConfig,
    /// Models by `{model}` path segment.
    pub models: BTreeMap<String, ModelConfig>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8182))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: None,
            not_found_image: None,
            cache: CacheConfig::default(),
            models: BTreeMap::from([("image".to_string(), ModelConfig::default())]),
        }
    }
}

impl ServerConfig {
    /// Validate config values are usable.
    ///
    /// Checks paths on disk, so call it after [`resolve_paths`](Self::resolve_paths).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let not_found = self.not_found_image()?;
        if !not_found.is_file() {
            return Err(ConfigError::Validation(format!(
                "not_found_image {} does not exist",
                not_found.display()
            )));
        }
        if self.models.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [models.<name>] table is required".into(),
            ));
        }
        for (name, model) in &self.models {
            if name.is_empty() || name.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "model name {name:?} must be a single path segment"
                )));
            }
            if model.output_formats.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "models.{name}.output_formats must not be empty"
                )));
            }
        }
        if let Some(base) = &self.base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::Validation(
                    "base_url must start with http:// or https://".into(),
                ));
            }
        }
        Ok(())
    }

    /// The configured not-found image.
    pub fn not_found_image(&self) -> Result<&Path, ConfigError> {
        self.not_found_image
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("not_found_image is required".into()))
    }

    /// Make relative paths relative to `base` (the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(path) = &mut self.not_found_image {
            *path = absolutize(base, path);
        }
        for model in self.models.values_mut() {
            model.root = absolutize(base, &model.root);
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Cache-Control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// `max-age` in seconds. Defaults to one year.
    pub expires_seconds: u64,
    /// Emit `public` instead of `private`.
    pub public: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expires_seconds: 31_536_000,
            public: false,
        }
    }
}

/// Which implementation backs a model. Closed set, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Filesystem,
}

/// One `[models.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Directory holding `<identifier>.<ext>` files.
    pub root: PathBuf,
    /// Extensions tried in order when resolving an identifier.
    pub extensions: Vec<String>,
    /// Output format tokens declared in `info.json`.
    pub output_formats: Vec<String>,
    /// Identifiers the authorizer refuses.
    pub denied: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Filesystem,
            root: PathBuf::from("images"),
            extensions: ["png", "jpg", "jpeg", "tif", "tiff"]
                .map(String::from)
                .to_vec(),
            output_formats: vec!["jpg".to_string(), "png".to_string()],
            denied: Vec::new(),
        }
    }
}

/// Parse, resolve relative paths against `base`, and validate.
pub fn parse_config(content: &str, base: &Path) -> Result<ServerConfig, ConfigError> {
    let mut config: ServerConfig = toml::from_str(content)?;
    config.resolve_paths(base);
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// A missing file yields the defaults, which still have to validate (and
/// will not, since the not-found image has no default).
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let base = path.parent().unwrap_or(Path::new("."));
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    parse_config(&content, base)
}

/// Returns a fully-commented stock `iiif.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# iiif-serve Configuration
# ========================
# Values shown below are the defaults, except not_found_image which is
# required. Relative paths are resolved against this file's directory.
# Unknown keys will cause an error.

# Address to listen on.
bind = "127.0.0.1:8182"

# Public URL prefix used for the "@id" of info.json documents, e.g. when
# running behind a proxy. When unset, the request's Host header is used.
# base_url = "https://images.example.org/iiif"

# Image served in place of a missing (404) or denied (401) image.
not_found_image = "not-found.png"

# ---------------------------------------------------------------------------
# Caching (successful responses only)
# ---------------------------------------------------------------------------
[cache]
# Cache-Control max-age in seconds (one year).
expires_seconds = 31536000

# Emit "public" instead of "private".
public = false

# ---------------------------------------------------------------------------
# Models: one table per {model} path segment
#   GET /{model}/{id}/{region}/{size}/{rotation}/{quality}.{format}
#   GET /{model}/{id}/info.json
# ---------------------------------------------------------------------------
[models.image]
# Only "filesystem" is available.
kind = "filesystem"

# Directory holding <identifier>.<ext> files.
root = "images"

# Extensions tried in order when resolving an identifier.
extensions = ["png", "jpg", "jpeg", "tif", "tiff"]

# Output formats declared in info.json and accepted on image requests.
# Available: jpg, png, gif, webp, tif
output_formats = ["jpg", "png"]

# Identifiers refused with 401 Unauthorized.
denied = []
"##
}
