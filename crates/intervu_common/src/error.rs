// --- File: crates/intervu_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by the Intervu crates.
///
/// Crate-specific errors convert into this type at the HTTP edge, where
/// [`HttpStatusCode`] decides the response status.
#[derive(Error, Debug)]
pub enum IntervuError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An upstream service is not connected or not authenticated
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for IntervuError {
    fn status_code(&self) -> u16 {
        match self {
            IntervuError::ConfigError(_) => 500,
            IntervuError::ValidationError(_) => 400,
            IntervuError::ServiceUnavailable(_) => 503,
            IntervuError::ExternalServiceError { .. } => 502,
            IntervuError::InternalError(_) => 500,
        }
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> IntervuError {
    IntervuError::ConfigError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> IntervuError {
    IntervuError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
