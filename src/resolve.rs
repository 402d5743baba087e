//! Image resolution, authorization and the request outcome.
//!
//! Three small pieces the service runs in order for every request:
//!
//! 1. [`ImageResolver::resolve`] asks the model's store for the identifier.
//!    A miss comes back as [`StoreError::NotFound`]; the caller decides
//!    whether to substitute [`ImageResolver::fallback`].
//! 2. [`authorize`] asks the model's authorizer and logs the answer.
//! 3. [`Outcome`] folds both results into the single value that drives the
//!    status code, the cache header, and fallback substitution.

use crate::model::{AuthTarget, ImageSource, ImageStore, Model, ResolvedImage, StoreError};
use crate::request::Action;
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves identifiers, and knows the not-found image to use instead.
///
/// The fallback path is validated when configuration is loaded, so
/// substitution itself cannot fail.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    fallback: PathBuf,
}

impl ImageResolver {
    pub fn new(fallback: PathBuf) -> Self {
        Self { fallback }
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback
    }

    /// Look `identifier` up in `store`. Performed fresh on every call.
    pub fn resolve(
        &self,
        store: &dyn ImageStore,
        identifier: &str,
    ) -> Result<ResolvedImage, StoreError> {
        let path = store.find(identifier)?;
        Ok(ResolvedImage {
            identifier: identifier.to_string(),
            path,
            source: ImageSource::Original,
        })
    }

    /// The not-found image, standing in for `identifier`.
    pub fn fallback(&self, identifier: &str) -> ResolvedImage {
        ResolvedImage {
            identifier: identifier.to_string(),
            path: self.fallback.clone(),
            source: ImageSource::Fallback,
        }
    }
}

/// Ask the model whether `action` is allowed on `target`.
pub fn authorize(model: &Model, action: Action, target: &AuthTarget<'_>) -> bool {
    let allowed = model.authorizer().can(action, target);
    debug!(
        model = model.name(),
        identifier = target.identifier(),
        action = action.as_str(),
        allowed,
        "authorization decision"
    );
    allowed
}

/// The business result of a request. Exactly one holds per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Unauthorized,
    NotFound,
}

impl Outcome {
    /// Outcome of an image request.
    ///
    /// A miss wins over a denial: the denial of an identifier that does not
    /// exist is reported as not found.
    pub fn for_show(found: bool, authorized: bool) -> Self {
        if !found {
            Outcome::NotFound
        } else if !authorized {
            Outcome::Unauthorized
        } else {
            Outcome::Ok
        }
    }

    /// Outcome of an `info.json` request. Misses never reach this point.
    pub fn for_info(authorized: bool) -> Self {
        if authorized {
            Outcome::Ok
        } else {
            Outcome::Unauthorized
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Outcome::Ok => StatusCode::OK,
            Outcome::Unauthorized => StatusCode::UNAUTHORIZED,
            Outcome::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Outcome::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Unauthorized => "unauthorized",
            Outcome::NotFound => "not_found",
        }
    }
}
