//! Full-image transcoding engine.
//!
//! ## Accepted parameters
//!
//! | Parameter | Accepted values |
//! |---|---|
//! | region | `full` |
//! | size | `full`, `max` |
//! | rotation | `0` |
//! | quality | `default`, `color`, `gray` |
//! | format | any [`OutputFormat`] token |
//!
//! Absent parameters take the IIIF defaults. Decoding and encoding use the
//! `image` crate's pure-Rust codecs.

use super::{EngineError, ImageEngine, ImageInfo};
use crate::format::OutputFormat;
use crate::model::ResolvedImage;
use crate::request::ImageRequest;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

const REGIONS: &[&str] = &["full"];
const SIZES: &[&str] = &["full", "max"];
const ROTATIONS: &[&str] = &["0"];
const QUALITIES: &[&str] = &["default", "color", "gray"];

#[derive(Debug, Clone, Copy, Default)]
pub struct TranscodeEngine;

impl TranscodeEngine {
    pub fn new() -> Self {
        Self
    }
}

fn check_attribute(
    name: &'static str,
    value: Option<&str>,
    accepted: &[&str],
) -> Result<(), EngineError> {
    match value {
        None => Ok(()),
        Some(v) if accepted.contains(&v) => Ok(()),
        Some(v) => Err(EngineError::InvalidAttribute {
            name,
            value: v.to_string(),
        }),
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, EngineError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            EngineError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn encode(image: DynamicImage, format: OutputFormat) -> Result<Vec<u8>, EngineError> {
    // JPEG has no alpha channel; the GIF and WebP encoders want RGBA.
    let image = match format {
        OutputFormat::Jpg => DynamicImage::ImageRgb8(image.to_rgb8()),
        OutputFormat::Gif | OutputFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8()),
        OutputFormat::Png | OutputFormat::Tif => image,
    };
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format.image_format())
        .map_err(|e| EngineError::ProcessingFailed(format!("Failed to encode {format}: {e}")))?;
    Ok(buffer.into_inner())
}

impl ImageEngine for TranscodeEngine {
    fn render(
        &self,
        image: &ResolvedImage,
        request: &ImageRequest,
    ) -> Result<Vec<u8>, EngineError> {
        check_attribute("region", request.region.as_deref(), REGIONS)?;
        check_attribute("size", request.size.as_deref(), SIZES)?;
        check_attribute("rotation", request.rotation.as_deref(), ROTATIONS)?;
        check_attribute("quality", request.quality.as_deref(), QUALITIES)?;
        let format =
            OutputFormat::from_token(&request.format).ok_or_else(|| EngineError::InvalidAttribute {
                name: "format",
                value: request.format.clone(),
            })?;

        let decoded = load_image(&image.path)?;
        let decoded = match request.quality.as_deref() {
            Some("gray") => DynamicImage::ImageLuma8(decoded.to_luma8()),
            _ => decoded,
        };
        encode(decoded, format)
    }

    fn info(&self, image: &ResolvedImage) -> Result<ImageInfo, EngineError> {
        let (width, height) = ImageReader::open(&image.path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                EngineError::ProcessingFailed(format!(
                    "Failed to read dimensions of {}: {}",
                    image.path.display(),
                    e
                ))
            })?;
        Ok(ImageInfo { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageSource;
    use crate::test_helpers::write_png;
    use image::ImageFormat;
    use tempfile::TempDir;

    fn resolved(path: &Path) -> ResolvedImage {
        ResolvedImage {
            identifier: "abc".into(),
            path: path.to_path_buf(),
            source: ImageSource::Original,
        }
    }

    fn request(region: Option<&str>, quality: Option<&str>, format: &str) -> ImageRequest {
        ImageRequest {
            identifier: "abc".into(),
            region: region.map(String::from),
            size: Some("max".into()),
            rotation: Some("0".into()),
            quality: quality.map(String::from),
            format: format.into(),
        }
    }

    #[test]
    fn renders_every_output_format() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "abc.png", 8, 6);
        let engine = TranscodeEngine::new();

        for format in OutputFormat::ALL {
            let bytes = engine
                .render(&resolved(&path), &request(Some("full"), None, format.token()))
                .unwrap();
            assert_eq!(
                image::guess_format(&bytes).unwrap(),
                format.image_format(),
                "{format} output has the wrong signature"
            );
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 6));
        }
    }

    #[test]
    fn gray_quality_drops_color() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "abc.png", 4, 4);

        let bytes = TranscodeEngine::new()
            .render(&resolved(&path), &request(None, Some("gray"), "png"))
            .unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert!(!decoded.color().has_color());
    }

    #[test]
    fn unsupported_parameters_are_invalid_attributes() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "abc.png", 4, 4);
        let engine = TranscodeEngine::new();

        let err = engine
            .render(&resolved(&path), &request(Some("0,0,2,2"), None, "png"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAttribute { name: "region", .. }));

        let err = engine
            .render(&resolved(&path), &request(None, Some("bitonal"), "png"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAttribute { name: "quality", .. }));

        let err = engine
            .render(&resolved(&path), &request(None, None, "jp2"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAttribute { name: "format", .. }));
    }

    #[test]
    fn parameters_are_checked_before_decoding() {
        let engine = TranscodeEngine::new();
        let missing = resolved(Path::new("/definitely/not/here.png"));

        let err = engine
            .render(&missing, &request(Some("square"), None, "png"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAttribute { .. }));
    }

    #[test]
    fn info_reads_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "abc.png", 12, 7);

        let info = TranscodeEngine::new().info(&resolved(&path)).unwrap();
        assert_eq!(info, ImageInfo { width: 12, height: 7 });
    }

    #[test]
    fn info_on_missing_file_is_io_error() {
        let err = TranscodeEngine::new()
            .info(&resolved(Path::new("/definitely/not/here.png")))
            .unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
