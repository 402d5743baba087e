//! Image engine trait and shared types.
//!
//! The [`ImageEngine`] trait defines the two operations a model needs from
//! its pixel backend: `render` (produce encoded bytes for a request) and
//! `info` (report dimensions for `info.json`).
//!
//! The bundled implementation is [`TranscodeEngine`], which serves the full
//! image in any registered output format. Region, size and rotation math
//! belong to a dedicated engine plugged in behind the same trait.

mod transcode;

pub use transcode::TranscodeEngine;

use crate::model::ResolvedImage;
use crate::request::ImageRequest;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A request parameter the engine cannot honour. Mapped to HTTP 400.
    #[error("invalid {name}: {value:?}")]
    InvalidAttribute { name: &'static str, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Intrinsic facts about an image, merged into `info.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

pub trait ImageEngine: Send + Sync {
    /// Render `request` against `image` and return the encoded bytes.
    fn render(&self, image: &ResolvedImage, request: &ImageRequest)
    -> Result<Vec<u8>, EngineError>;

    /// Read the image's dimensions.
    fn info(&self, image: &ResolvedImage) -> Result<ImageInfo, EngineError>;
}
