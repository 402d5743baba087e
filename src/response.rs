//! HTTP response assembly.
//!
//! Header policy per response:
//!
//! | Response | CORS | Cache-Control | Link (profile) |
//! |---|---|---|---|
//! | image, `Ok` | yes | yes | yes |
//! | image, `Unauthorized` / `NotFound` | yes | no | yes |
//! | info, `Ok` | yes | yes | yes |
//! | info, denied | no | no | yes |
//! | errors (400/404/500) | no | no | yes |
//!
//! The `Link` header is added by the [`profile_link`] layer so that it also
//! lands on error responses.

use crate::format::OutputFormat;
use crate::info::InfoDocument;
use crate::resolve::Outcome;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, LINK,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const LD_JSON: &str = "application/ld+json";
pub const UNAUTHORIZED_BODY: &str = r#"{"error":"unauthorized"}"#;
pub const PROFILE_LINK: &str = r#"<http://iiif.io/api/image/2/level1.json>;rel="profile""#;

/// Cache lifetime and visibility for successful responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    header: HeaderValue,
}

impl CachePolicy {
    pub fn new(max_age: u64, public: bool) -> Self {
        let visibility = if public { "public" } else { "private" };
        let header = HeaderValue::from_str(&format!("max-age={max_age}, {visibility}"))
            .unwrap_or_else(|_| HeaderValue::from_static("private"));
        Self { header }
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.header
    }
}

fn with_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

/// Image bytes with the status and headers `outcome` calls for.
pub fn show(outcome: Outcome, format: OutputFormat, bytes: Vec<u8>, cache: &CachePolicy) -> Response {
    let mut headers = HeaderMap::new();
    with_cors(&mut headers);
    if outcome.is_ok() {
        headers.insert(CACHE_CONTROL, cache.header_value().clone());
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(format.content_type()));
    headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
    (outcome.status(), headers, bytes).into_response()
}

/// A successful `info.json` response.
pub fn info(document: &InfoDocument, cache: &CachePolicy) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(document)?;
    let mut headers = HeaderMap::new();
    with_cors(&mut headers);
    headers.insert(CACHE_CONTROL, cache.header_value().clone());
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(LD_JSON));
    Ok((StatusCode::OK, headers, body).into_response())
}

/// The denied `info.json` response. No CORS, no caching.
pub fn unauthorized_info() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        UNAUTHORIZED_BODY,
    )
        .into_response()
}

/// Response layer that sets the IIIF profile `Link` header.
pub async fn profile_link(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(LINK, HeaderValue::from_static(PROFILE_LINK));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ImageInfo;
    use crate::info::LEVEL1_PROFILE;

    async fn body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn cache() -> CachePolicy {
        CachePolicy::new(31_536_000, false)
    }

    #[test]
    fn cache_header_is_private_by_default() {
        assert_eq!(cache().header_value(), "max-age=31536000, private");
        assert_eq!(
            CachePolicy::new(60, true).header_value(),
            "max-age=60, public"
        );
    }

    #[tokio::test]
    async fn show_ok_sets_cache_and_cors() {
        let response = show(Outcome::Ok, OutputFormat::Jpg, b"jpeg".to_vec(), &cache());

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CACHE_CONTROL], "max-age=31536000, private");
        assert_eq!(headers[CONTENT_TYPE], "image/jpeg");
        assert_eq!(headers[CONTENT_DISPOSITION], "inline");
        assert_eq!(body(response).await, b"jpeg");
    }

    #[tokio::test]
    async fn show_failures_skip_cache_but_keep_body() {
        for outcome in [Outcome::Unauthorized, Outcome::NotFound] {
            let response = show(outcome, OutputFormat::Png, b"fallback".to_vec(), &cache());

            assert_eq!(response.status(), outcome.status());
            assert!(response.headers().get(CACHE_CONTROL).is_none());
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(body(response).await, b"fallback");
        }
    }

    #[tokio::test]
    async fn info_is_ld_json_with_cache() {
        let doc = InfoDocument::build(
            "http://host/image/abc/info.json",
            &ImageInfo {
                width: 1,
                height: 2,
            },
            &[OutputFormat::Jpg],
        );
        let response = info(&doc, &cache()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], LD_JSON);
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=31536000, private");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(json["@id"], "http://host/image/abc");
    }

    #[tokio::test]
    async fn unauthorized_info_has_no_cors_or_cache() {
        let response = unauthorized_info();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert_eq!(body(response).await, br#"{"error":"unauthorized"}"#);
    }

    #[tokio::test]
    async fn profile_link_layer_sets_header() {
        let response = profile_link(StatusCode::BAD_REQUEST.into_response()).await;

        assert!(PROFILE_LINK.contains(LEVEL1_PROFILE));
        assert_eq!(
            response.headers()[LINK],
            r#"<http://iiif.io/api/image/2/level1.json>;rel="profile""#
        );
    }
}
