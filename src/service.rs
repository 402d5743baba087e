//! Request orchestration.
//!
//! [`ImageService`] turns `{model, identifier, parameters}` into a response.
//! Every call runs the same strictly sequential pipeline:
//!
//! ```text
//! extract params → resolve → authorize → outcome → render | info → assemble
//! ```
//!
//! Nothing is shared between requests except the read-only model registry,
//! the not-found image path, and the cache policy.

use crate::config::{ConfigError, ServerConfig};
use crate::error::ServiceError;
use crate::info::InfoDocument;
use crate::model::{AuthTarget, Model, ModelRegistry, StoreError};
use crate::request::{Action, ImageRequest};
use crate::resolve::{ImageResolver, Outcome, authorize};
use crate::response::{self, CachePolicy};
use axum::response::Response;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

pub struct ImageService {
    models: ModelRegistry,
    resolver: ImageResolver,
    cache: CachePolicy,
}

impl ImageService {
    pub fn new(models: ModelRegistry, not_found_image: PathBuf, cache: CachePolicy) -> Self {
        Self {
            models,
            resolver: ImageResolver::new(not_found_image),
            cache,
        }
    }

    /// Build the service from a validated configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let not_found_image = config.not_found_image()?.to_path_buf();
        Ok(Self::new(
            ModelRegistry::from_config(config)?,
            not_found_image,
            CachePolicy::new(config.cache.expires_seconds, config.cache.public),
        ))
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn cache_policy(&self) -> &CachePolicy {
        &self.cache
    }

    fn model(&self, name: &str) -> Result<&Model, ServiceError> {
        self.models
            .get(name)
            .ok_or_else(|| ServiceError::UnknownModel(name.to_string()))
    }

    /// Serve image bytes.
    ///
    /// A miss or a denial still renders, against the not-found image, with
    /// a 404 or 401 status and no cache header.
    #[tracing::instrument(name = "show", skip(self, raw_params), fields(outcome = tracing::field::Empty))]
    pub fn show(
        &self,
        model: &str,
        identifier: &str,
        raw_params: &HashMap<String, String>,
    ) -> Result<Response, ServiceError> {
        let model = self.model(model)?;
        let request = ImageRequest::extract(identifier, raw_params)?;
        let format = model.output_format(&request.format).ok_or_else(|| {
            ServiceError::InvalidParameter(format!("unsupported format {:?}", request.format))
        })?;

        let (image, outcome) = match self.resolver.resolve(model.store(), identifier) {
            Ok(image) => {
                let authorized = authorize(model, Action::Show, &AuthTarget::Resolved(&image));
                (Some(image), Outcome::for_show(true, authorized))
            }
            Err(StoreError::NotFound(_)) => {
                // Judged against the requested identifier, never the fallback.
                let authorized = authorize(model, Action::Show, &AuthTarget::Pending(identifier));
                (None, Outcome::for_show(false, authorized))
            }
            Err(e) => return Err(e.into()),
        };
        tracing::Span::current().record("outcome", outcome.as_str());

        let image = match image {
            Some(image) if outcome.is_ok() => image,
            _ => {
                warn!(
                    model = model.name(),
                    identifier,
                    outcome = outcome.as_str(),
                    "serving not-found image"
                );
                self.resolver.fallback(identifier)
            }
        };

        let bytes = model.engine().render(&image, &request)?;
        info!(
            model = model.name(),
            identifier,
            format = format.token(),
            bytes = bytes.len(),
            status = outcome.status().as_u16(),
            "rendered image"
        );
        Ok(response::show(outcome, format, bytes, &self.cache))
    }

    /// Serve `info.json`.
    ///
    /// `request_url` is the absolute URL the client asked for; its
    /// `/info.json` suffix is stripped to form `@id`.
    #[tracing::instrument(name = "info", skip(self), fields(outcome = tracing::field::Empty))]
    pub fn info(
        &self,
        model: &str,
        identifier: &str,
        request_url: &str,
    ) -> Result<Response, ServiceError> {
        let model = self.model(model)?;
        let image = self.resolver.resolve(model.store(), identifier)?;

        let authorized = authorize(model, Action::Info, &AuthTarget::Resolved(&image));
        let outcome = Outcome::for_info(authorized);
        tracing::Span::current().record("outcome", outcome.as_str());
        if !outcome.is_ok() {
            return Ok(response::unauthorized_info());
        }

        let image_info = model.engine().info(&image)?;
        let document = InfoDocument::build(request_url, &image_info, model.output_formats());
        Ok(response::info(&document, &self.cache)?)
    }
}
