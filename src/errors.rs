//! Error handling for the prediction service
//!
//! Library code returns [`PredictError`]; the HTTP layer converts it into
//! [`crate::api_errors::AppError`] at the handler boundary.

use thiserror::Error;

/// Main error type for model loading and inference
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact {path} is unusable: {message}")]
    Artifact { path: String, message: String },

    #[error("Feature count mismatch: model expects {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Estimator failed: {message}")]
    Estimator { message: String },

    #[error("Reference dataset error: {message}")]
    Dataset { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

/// Type alias for Result with PredictError
pub type PredictResult<T> = Result<T, PredictError>;

impl PredictError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an artifact decoding/encoding error
    pub fn artifact(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Wrap a failure reported by the underlying estimator
    pub fn estimator(message: impl Into<String>) -> Self {
        Self::Estimator {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::Validation { .. })
    }
}

impl From<smartcore::error::Failed> for PredictError {
    fn from(err: smartcore::error::Failed) -> Self {
        PredictError::estimator(err.to_string())
    }
}
