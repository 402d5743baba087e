//! Output format registry.
//!
//! Maps the `{format}` token of an image request to a response content type
//! and to the encoder the engine should use. The set is closed: a token that
//! is not listed here is rejected before any image work happens.
//!
//! | Token | Content type | Encoder |
//! |---|---|---|
//! | `jpg` | `image/jpeg` | `ImageFormat::Jpeg` |
//! | `png` | `image/png` | `ImageFormat::Png` |
//! | `gif` | `image/gif` | `ImageFormat::Gif` |
//! | `webp` | `image/webp` | `ImageFormat::WebP` |
//! | `tif` | `image/tiff` | `ImageFormat::Tiff` |

use image::ImageFormat;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpg,
    Png,
    Gif,
    Webp,
    Tif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Jpg,
        OutputFormat::Png,
        OutputFormat::Gif,
        OutputFormat::Webp,
        OutputFormat::Tif,
    ];

    /// Parse a request token. Matching is exact: IIIF format tokens are lowercase.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }

    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
            OutputFormat::Webp => "webp",
            OutputFormat::Tif => "tif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Tif => "image/tiff",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Webp => ImageFormat::WebP,
            OutputFormat::Tif => ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
