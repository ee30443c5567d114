//! Mapping of lookup failures to HTTP responses.

use std::any::Any;

use airmap::provider::ErrorBody;
use airmap::AirmapError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Message sent instead of the details of an unexpected failure.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Error returned by the handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not a JSON request.
    #[error("Missing required parameters")]
    MalformedBody(#[from] JsonRejection),

    /// Validation or lookup failed.
    #[error(transparent)]
    Lookup(#[from] AirmapError),
}

impl ApiError {
    /// Response status: `400` for bad input, `404` for missing data, `500` otherwise.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Lookup(AirmapError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Lookup(AirmapError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        if self.status().is_server_error() {
            SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::MalformedBody(rejection) => log::warn!("Rejected body: {rejection}"),
            Self::Lookup(err) if status.is_server_error() => {
                log::error!("Error generating maps: {err:?}")
            }
            Self::Lookup(err) => log::info!("{status}: {err}"),
        }

        (status, Json(ErrorBody::new(self.message()))).into_response()
    }
}

/// Response sent by the panic catching layer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    log::error!("Handler panicked: {details}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(SERVER_ERROR_MESSAGE)),
    )
        .into_response()
}
