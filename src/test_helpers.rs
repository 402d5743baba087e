//! Shared test utilities for the iiif-serve test suite.
//!
//! Provides small on-disk fixtures (generated PNGs, an image root with a
//! not-found image) and a service wired to a [`MockEngine`].
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let fixture = Fixture::new();
//! fixture.add_image("abc123");
//! let service = fixture.service(MockEngine::new(), &[]);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::engine::ImageEngine;
use crate::format::OutputFormat;
use crate::model::{FileStore, Model, ModelRegistry, StaticAuthorizer};
use crate::response::CachePolicy;
use crate::service::ImageService;

/// Write a `width`×`height` RGB gradient PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 30 % 256) as u8, (y * 40 % 256) as u8, 128])
    });
    img.save(&path).unwrap();
    path
}

/// A temp directory holding an `images/` root and a `not-found.png`.
pub struct Fixture {
    pub dir: TempDir,
    pub root: PathBuf,
    pub not_found: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("images");
        std::fs::create_dir(&root).unwrap();
        let not_found = write_png(dir.path(), "not-found.png", 3, 3);
        Self {
            dir,
            root,
            not_found,
        }
    }

    pub fn add_image(&self, identifier: &str) -> PathBuf {
        write_png(&self.root, &format!("{identifier}.png"), 16, 9)
    }

    /// Service with a single `image` model declaring jpg and png.
    pub fn service(&self, engine: impl ImageEngine + 'static, denied: &[&str]) -> ImageService {
        self.service_with_engine(Arc::new(engine), denied)
    }

    pub fn service_with_engine(&self, engine: Arc<dyn ImageEngine>, denied: &[&str]) -> ImageService {
        let store = FileStore::new(&self.root, &["png".to_string()]).unwrap();
        let model = Model::new(
            "image",
            Arc::new(store),
            Arc::new(StaticAuthorizer::new(denied.iter().map(|d| d.to_string()))),
            engine,
            vec![OutputFormat::Jpg, OutputFormat::Png],
        );
        let mut models = ModelRegistry::new();
        models.insert(model);
        ImageService::new(models, self.not_found.clone(), CachePolicy::new(31_536_000, false))
    }
}
