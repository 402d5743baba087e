//! Image models: the capability set behind a `{model}` path segment.
//!
//! A [`Model`] bundles the four things a request needs from the outside
//! world:
//!
//! | Capability | Trait | Bundled implementation |
//! |---|---|---|
//! | **Resolve** identifier → file | [`ImageStore`] | [`FileStore`] |
//! | **Authorize** an action | [`Authorizer`] | [`StaticAuthorizer`] |
//! | **Render** pixels | [`ImageEngine`](crate::engine::ImageEngine) | [`TranscodeEngine`](crate::engine::TranscodeEngine) |
//! | **Describe** (`info.json`) | [`ImageEngine`](crate::engine::ImageEngine) | same |
//!
//! Models are built once from configuration into a [`ModelRegistry`]; the
//! mapping from [`ModelKind`](crate::config::ModelKind) to implementation is
//! a closed `match`, so requests can only ever select a model that was
//! configured at startup.

pub mod authorization;
pub mod filesystem;

pub use authorization::{AuthTarget, Authorizer, StaticAuthorizer};
pub use filesystem::FileStore;

use crate::config::{ConfigError, ModelConfig, ModelKind, ServerConfig};
use crate::engine::{ImageEngine, TranscodeEngine};
use crate::format::OutputFormat;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which file a resolved image points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Original,
    Fallback,
}

/// Handle produced by the resolver. Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub identifier: String,
    pub path: PathBuf,
    pub source: ImageSource,
}

/// Resolves identifiers to image files.
pub trait ImageStore: Send + Sync {
    /// Locate the file for `identifier`.
    ///
    /// A miss must be reported as [`StoreError::NotFound`]; any other error
    /// is treated as a hard failure by the caller.
    fn find(&self, identifier: &str) -> Result<PathBuf, StoreError>;
}

/// One configured model.
#[derive(Clone)]
pub struct Model {
    name: String,
    store: Arc<dyn ImageStore>,
    authorizer: Arc<dyn Authorizer>,
    engine: Arc<dyn ImageEngine>,
    output_formats: Vec<OutputFormat>,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn ImageStore>,
        authorizer: Arc<dyn Authorizer>,
        engine: Arc<dyn ImageEngine>,
        output_formats: Vec<OutputFormat>,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            authorizer,
            engine,
            output_formats,
        }
    }

    /// Build a model from its configuration section.
    pub fn from_config(name: &str, config: &ModelConfig) -> Result<Self, ConfigError> {
        let store: Arc<dyn ImageStore> = match config.kind {
            ModelKind::Filesystem => Arc::new(FileStore::new(&config.root, &config.extensions)?),
        };
        let output_formats = config
            .output_formats
            .iter()
            .map(|token| {
                OutputFormat::from_token(token).ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "models.{name}.output_formats: unsupported format '{token}'"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(
            name,
            store,
            Arc::new(StaticAuthorizer::new(config.denied.iter().cloned())),
            Arc::new(TranscodeEngine::new()),
            output_formats,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn ImageStore {
        self.store.as_ref()
    }

    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    pub fn engine(&self) -> &dyn ImageEngine {
        self.engine.as_ref()
    }

    /// Formats this model declares in `info.json` and accepts on image requests.
    pub fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    /// Resolve a request's format token against the declared formats.
    pub fn output_format(&self, token: &str) -> Option<OutputFormat> {
        OutputFormat::from_token(token).filter(|f| self.output_formats.contains(f))
    }
}

/// Models by name, fixed at startup.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (name, model_config) in &config.models {
            registry.insert(Model::from_config(name, model_config)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
