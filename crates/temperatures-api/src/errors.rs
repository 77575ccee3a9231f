//! Error types for the HTTP service.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use temperatures_core::{ResolveError, ValidationError};
use tracing::error;

/// Lookup handler errors with HTTP status code mapping
///
/// This error type represents every failure a lookup request can produce and
/// maps each to its wire status:
///
/// - `422 Unprocessable Entity`: validation failures (missing or malformed
///   postal code), raised before any network call
/// - `404 Not Found`: the postal code does not resolve to a known locality,
///   or the entry endpoint was called with a method other than POST
/// - `500 Internal Server Error`: transport failures, undecodable upstream
///   responses, malformed request bodies
///
/// Response bodies are plain human-readable messages, not structured error
/// codes. Causes are logged server-side before the response is written.
#[derive(Debug, thiserror::Error)]
pub enum LookupHandlerError {
    /// The postal code failed one of the two validation policies
    ///
    /// Maps to: `422 Unprocessable Entity`
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A resolver or the peer service failed
    ///
    /// Maps to: `404 Not Found` for the not-found business outcome,
    /// `500 Internal Server Error` for everything else.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The request body did not decode as a postal-code payload
    ///
    /// Maps to: `500 Internal Server Error`. A malformed payload is a hard
    /// error, deliberately not folded into "required".
    #[error("internal server error")]
    MalformedBody { message: String },

    /// The entry endpoint only accepts POST; anything else is rejected
    /// before validation runs
    ///
    /// Maps to: `404 Not Found`
    #[error("not found")]
    MethodNotAllowed,
}

impl LookupHandlerError {
    /// The HTTP status this error maps to at the transport boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Resolve(ResolveError::NotFound) => StatusCode::NOT_FOUND,
            Self::Resolve(ResolveError::Internal { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedBody { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for LookupHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log the originating cause server-side; the client only ever sees
        // the plain display message.
        match &self {
            Self::Resolve(ResolveError::Internal { message }) => {
                error!(error = %message, "Lookup failed with internal error");
            }
            Self::MalformedBody { message } => {
                error!(error = %message, "Failed to decode request body");
            }
            _ => {}
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Telemetry initialization failed: {message}")]
    Telemetry { message: String },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: &'static str },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
