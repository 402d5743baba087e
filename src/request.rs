//! Image request parameters.
//!
//! The HTTP layer hands over every raw key/value it captured (path segments,
//! model token, identifier). [`ImageRequest::extract`] keeps only the five
//! IIIF parameters and performs no grammar checks; interpreting `region`,
//! `size`, `rotation` and `quality` is the engine's job.

use crate::error::ServiceError;
use std::collections::HashMap;
use std::fmt;

/// What the client asked to do with an image. Passed to the authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    Info,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Show => "show",
            Action::Info => "info",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A whitelisted image request.
///
/// Optional fields stay `None` when absent; the engine applies the IIIF
/// defaults (`full`, `full`, `0`, `default`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub identifier: String,
    pub region: Option<String>,
    pub size: Option<String>,
    pub rotation: Option<String>,
    pub quality: Option<String>,
    pub format: String,
}

impl ImageRequest {
    /// Filter raw parameters down to the IIIF set.
    ///
    /// Only `format` is required, since it selects the content type.
    pub fn extract(identifier: &str, raw: &HashMap<String, String>) -> Result<Self, ServiceError> {
        let take = |key: &str| raw.get(key).cloned();
        let format = take("format")
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ServiceError::InvalidParameter("format is required".into()))?;

        Ok(Self {
            identifier: identifier.to_string(),
            region: take("region"),
            size: take("size"),
            rotation: take("rotation"),
            quality: take("quality"),
            format,
        })
    }
}

/// Split the last path segment `{quality}.{format}` on its final dot.
///
/// Returns `None` when there is no dot at all.
pub fn split_quality_format(segment: &str) -> Option<(&str, &str)> {
    segment.rsplit_once('.')
}
