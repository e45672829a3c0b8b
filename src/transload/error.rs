//! Relay failures and their HTTP representation.
//!
//! Validation failures answer with their own 4xx status and a plain-text
//! message. Everything else goes through [`normalize`], which produces a
//! structured 500.

use std::any::Any;
use std::error::Error as StdError;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::transload::destination::DestinationError;
use crate::transload::range::RangeError;

/// Failure half of a relay attempt.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing x-gtr-copy-source header")]
    MissingCopySource,

    #[error("invalid x-gtr-copy-source header: {0}")]
    InvalidCopySource(String),

    #[error("invalid x-gtr-source-range header: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("invalid x-gtr-copy-source header: not takeout url or test server url")]
    SourceNotAllowed,

    #[error("invalid destination path: {0}")]
    InvalidDestination(#[from] DestinationError),

    #[error("source fetch failed")]
    Source(#[source] reqwest::Error),

    #[error("destination write failed")]
    Destination(#[source] reqwest::Error),
}

impl RelayError {
    /// Short, stable name for the failure kind.
    pub fn name(&self) -> &'static str {
        match self {
            RelayError::MissingCopySource => "MissingCopySource",
            RelayError::InvalidCopySource(_) => "InvalidCopySource",
            RelayError::InvalidRange(_) => "InvalidRange",
            RelayError::SourceNotAllowed => "SourceNotAllowed",
            RelayError::InvalidDestination(_) => "InvalidDestination",
            RelayError::Source(_) => "SourceError",
            RelayError::Destination(_) => "DestinationError",
        }
    }

    /// Status for failures detected before any network call, `None` otherwise.
    pub fn client_status(&self) -> Option<StatusCode> {
        match self {
            RelayError::MissingCopySource
            | RelayError::InvalidCopySource(_)
            | RelayError::InvalidRange(_)
            | RelayError::InvalidDestination(_) => Some(StatusCode::BAD_REQUEST),
            RelayError::SourceNotAllowed => Some(StatusCode::FORBIDDEN),
            RelayError::Source(_) | RelayError::Destination(_) => None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self.client_status() {
            Some(status) => (status, self.to_string()).into_response(),
            None => normalize(&self),
        }
    }
}

/// Serializable description of an unexpected failure.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub name: String,
    pub message: String,
    /// The error's source chain, outermost first.
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn new(error: &RelayError) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            name: error.name().to_string(),
            message: error.to_string(),
            causes,
        }
    }
}

/// Convert an unexpected failure into a structured 500 response.
pub fn normalize(error: &RelayError) -> Response {
    tracing::error!(error = %error, kind = error.name(), "Transload failed");

    match serde_json::to_string(&ErrorReport::new(error)) {
        Ok(body) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(_) => unknown_error(),
    }
}

/// The response for failures with no usable error value.
pub fn unknown_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "unknown error").into_response()
}

/// `CatchPanicLayer` handler: a panic payload is not an error value.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(panic = %detail, "Handler panicked");
    unknown_error()
}
