//! HTTP surface.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /{model}/{id}/{region}/{size}/{rotation}/{quality}.{format}` | [`ImageService::show`] |
//! | `GET /{model}/{id}/info.json` | [`ImageService::info`] |
//! | `GET /{model}/{id}` | 302 to `/{model}/{id}/info.json` |
//!
//! Service calls decode and encode images, so they run on the blocking pool.

use crate::error::ServiceError;
use crate::request::split_quality_format;
use crate::response::profile_link;
use crate::service::ImageService;
use axum::extract::{OriginalUri, Path, State};
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, middleware};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ImageService>,
    /// Public URL prefix for `@id`; `None` means "use the Host header".
    pub base_url: Option<String>,
}

impl AppState {
    pub fn new(service: ImageService, base_url: Option<String>) -> Self {
        Self {
            service: Arc::new(service),
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let iiif = Router::new()
        .route(
            "/{model}/{id}/{region}/{size}/{rotation}/{quality_format}",
            get(show),
        )
        .route("/{model}/{id}/info.json", get(info))
        .layer(middleware::map_response(profile_link));

    Router::new()
        .route("/{model}/{id}", get(redirect_to_info))
        .merge(iiif)
        .with_state(state)
}

async fn run_blocking<F>(f: F) -> Result<Response, ServiceError>
where
    F: FnOnce() -> Result<Response, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
}

async fn show(
    State(state): State<AppState>,
    Path((model, id, region, size, rotation, quality_format)): Path<(
        String,
        String,
        String,
        String,
        String,
        String,
    )>,
) -> Result<Response, ServiceError> {
    let (quality, format) = split_quality_format(&quality_format).ok_or_else(|| {
        ServiceError::InvalidParameter(format!("missing format in {quality_format:?}"))
    })?;

    let params = HashMap::from([
        ("model".to_string(), model.clone()),
        ("id".to_string(), id.clone()),
        ("region".to_string(), region),
        ("size".to_string(), size),
        ("rotation".to_string(), rotation),
        ("quality".to_string(), quality.to_string()),
        ("format".to_string(), format.to_string()),
    ]);

    let service = state.service.clone();
    run_blocking(move || service.show(&model, &id, &params)).await
}

async fn info(
    State(state): State<AppState>,
    Path((model, id)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let request_url = request_url(&state, &headers, &uri);
    debug!(%request_url, "info request");

    let service = state.service.clone();
    run_blocking(move || service.info(&model, &id, &request_url)).await
}

/// Absolute URL of the current request.
fn request_url(state: &AppState, headers: &HeaderMap, uri: &axum::http::Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    match &state.base_url {
        Some(base) => format!("{base}{path}"),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}{path}")
        }
    }
}

/// Location is built from the raw request path so percent-encoded
/// identifiers stay a single segment.
async fn redirect_to_info(OriginalUri(uri): OriginalUri) -> Response {
    let location = format!("{}/info.json", uri.path());
    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn state(base_url: Option<&str>) -> AppState {
        let fixture = crate::test_helpers::Fixture::new();
        AppState::new(
            fixture.service(crate::engine::tests::MockEngine::new(), &[]),
            base_url.map(String::from),
        )
    }

    #[test]
    fn request_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("iiif.example:8182"));
        let uri: Uri = "/image/abc/info.json".parse().unwrap();

        assert_eq!(
            request_url(&state(None), &headers, &uri),
            "http://iiif.example:8182/image/abc/info.json"
        );
    }

    #[test]
    fn request_url_prefers_base_url() {
        let uri: Uri = "/image/abc/info.json".parse().unwrap();

        assert_eq!(
            request_url(&state(Some("https://cdn.example/iiif/")), &HeaderMap::new(), &uri),
            "https://cdn.example/iiif/image/abc/info.json"
        );
    }

    #[test]
    fn request_url_defaults_host() {
        let uri: Uri = "/image/abc/info.json?v=2".parse().unwrap();

        assert_eq!(
            request_url(&state(None), &HeaderMap::new(), &uri),
            "http://localhost/image/abc/info.json?v=2"
        );
    }
}
