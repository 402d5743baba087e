//! The `info.json` document.
//!
//! ```json
//! {
//!   "@context": "http://iiif.io/api/image/2/context.json",
//!   "@id": "http://host/image/abc123",
//!   "protocol": "http://iiif.io/api/image",
//!   "width": 640,
//!   "height": 480,
//!   "profile": ["http://iiif.io/api/image/2/level1.json", {"formats": ["jpg", "png"]}]
//! }
//! ```

use crate::engine::ImageInfo;
use crate::format::OutputFormat;
use serde::Serialize;

pub const CONTEXT_URI: &str = "http://iiif.io/api/image/2/context.json";
pub const PROTOCOL_URI: &str = "http://iiif.io/api/image";
pub const LEVEL1_PROFILE: &str = "http://iiif.io/api/image/2/level1.json";

const INFO_SUFFIX: &str = "/info.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoDocument {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub protocol: &'static str,
    pub width: u32,
    pub height: u32,
    pub profile: Profile,
}

/// Serialized as `[<level uri>, {"formats": [...]}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile(pub &'static str, pub ProfileFormats);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFormats {
    pub formats: Vec<&'static str>,
}

impl InfoDocument {
    pub fn build(request_url: &str, info: &ImageInfo, formats: &[OutputFormat]) -> Self {
        Self {
            context: CONTEXT_URI,
            id: canonical_id(request_url),
            protocol: PROTOCOL_URI,
            width: info.width,
            height: info.height,
            profile: Profile(
                LEVEL1_PROFILE,
                ProfileFormats {
                    formats: formats.iter().map(|f| f.token()).collect(),
                },
            ),
        }
    }
}

/// The request URL with its trailing `/info.json` removed.
///
/// The query string is dropped; only the final suffix of the path is
/// stripped, so an identifier that is itself `info.json` survives.
pub fn canonical_id(request_url: &str) -> String {
    let url = request_url
        .split_once('?')
        .map_or(request_url, |(path, _)| path);
    url.strip_suffix(INFO_SUFFIX).unwrap_or(url).to_string()
}
