//! # iiif-serve
//!
//! An IIIF Image API server (level 1 profile). Given a model, an image
//! identifier and the IIIF request parameters, it authorizes the request,
//! resolves the image (substituting a configured not-found image when it is
//! absent), hands pixel work to an image engine, and answers with image
//! bytes or an `info.json` document carrying protocol-correct headers.
//!
//! # Request Pipeline
//!
//! ```text
//! HTTP → extract params → resolve → authorize → outcome → render | info → response
//! ```
//!
//! Each request runs the pipeline once, strictly in order, with no shared
//! mutable state. The [`resolve::Outcome`] computed in the middle
//! (`Ok`, `Unauthorized` or `NotFound`) is the single value that decides the
//! status code, whether a cache header is sent, and whether the not-found
//! image is rendered instead of the requested one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`request`] | Whitelists the five IIIF parameters into an [`request::ImageRequest`] |
//! | [`model`] | Store, authorizer and engine bundled per `{model}`; the registry built at startup |
//! | [`engine`] | [`engine::ImageEngine`] trait and the bundled transcoding engine |
//! | [`resolve`] | Identifier resolution, not-found substitution, authorization, outcome |
//! | [`response`] | Status, CORS, Cache-Control, content type and profile `Link` headers |
//! | [`info`] | The `info.json` JSON-LD document |
//! | [`error`] | Request errors and their HTTP status mapping |
//! | [`service`] | Orchestrates one show or info request |
//! | [`server`] | axum routes |
//! | [`config`] | `iiif.toml` loading and validation |
//! | [`format`] | Output format tokens, content types and encoders |
//!
//! # Design Decisions
//!
//! ## Failures Still Render
//!
//! A missing or denied image is answered with the not-found image, rendered
//! with the requested parameters, under a 404 or 401 status. Viewers keep
//! showing *something*, and because no `Cache-Control` header is sent on
//! those responses, caches never hold on to them.
//!
//! ## Fail Fast on Configuration
//!
//! The not-found image is required and checked when the configuration is
//! loaded. Models are a closed set built once at startup, so a request can
//! only pick a model that exists; an unknown `{model}` is a plain 404.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod info;
pub mod model;
pub mod request;
pub mod resolve;
pub mod response;
pub mod server;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;
