//! Error types for namebook.
//!
//! Store and form failures have their own enums next to the code that
//! raises them; this module gathers them with configuration and I/O errors
//! into the crate-wide [`Error`].

use thiserror::Error;

use crate::form::{FormError, ValidationError};
use crate::store::StoreError;

/// The main error type for namebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// The record store reported a failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    // === Form Errors ===
    /// A name field was rejected.
    #[error("invalid input")]
    Validation(#[from] ValidationError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for namebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(e) => Self::Validation(e),
            FormError::Store(e) => Self::Store(e),
        }
    }
}

impl Error {
    /// Check if this error came from input validation.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error means the store could not be reached.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_unavailable())
    }
}
