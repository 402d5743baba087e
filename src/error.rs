//! Request-level errors and their HTTP mapping.
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | [`ServiceError::InvalidParameter`] | 400 | empty |
//! | [`ServiceError::ImageNotFound`], [`ServiceError::UnknownModel`] | 404 | empty |
//! | anything else | 500 | empty, logged |
//!
//! A store miss on the image path never becomes an error; the service
//! substitutes the not-found image instead. Only the `info.json` path lets a
//! miss through to here.

use crate::engine::EngineError;
use crate::model::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid request parameter: {0}")]
    InvalidParameter(String),
    #[error("image not found: {0}")]
    ImageNotFound(String),
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("image store failure: {0}")]
    Store(std::io::Error),
    #[error("image engine failure: {0}")]
    Engine(EngineError),
    #[error("failed to serialize info.json: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("request task failed: {0}")]
    Task(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(identifier) => ServiceError::ImageNotFound(identifier),
            StoreError::Io(e) => ServiceError::Store(e),
        }
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidAttribute { .. } => ServiceError::InvalidParameter(err.to_string()),
            other => ServiceError::Engine(other),
        }
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::ImageNotFound(_) | ServiceError::UnknownModel(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Store(_)
            | ServiceError::Engine(_)
            | ServiceError::Serialize(_)
            | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_attribute_maps_to_bad_request() {
        let err: ServiceError = EngineError::InvalidAttribute {
            name: "region",
            value: "bogus".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::InvalidParameter(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_engine_errors_are_internal() {
        let err: ServiceError = EngineError::ProcessingFailed("decoder exploded".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_miss_maps_to_not_found() {
        let err: ServiceError = StoreError::NotFound("abc".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ServiceError =
            StoreError::Io(std::io::Error::other("disk on fire")).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn responses_have_empty_bodies() {
        for err in [
            ServiceError::InvalidParameter("format".into()),
            ServiceError::UnknownModel("nope".into()),
            ServiceError::Engine(EngineError::ProcessingFailed("secret detail".into())),
        ] {
            let status = err.status();
            let response = err.into_response();
            assert_eq!(response.status(), status);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(body.is_empty());
        }
    }
}
