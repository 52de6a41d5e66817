//! Error types for GeoParam

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoparamError {
    // Payload errors
    #[error("Invalid {format} format: {reason}")]
    MalformedInput { format: String, reason: String },

    #[error("Unsupported data format: {mime_type}")]
    UnsupportedFormat { mime_type: String },

    // Parameter errors
    #[error("Missing value for parameter {name}")]
    MissingParameterValue { name: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

/// Coarse classification of a [`GeoparamError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload does not parse under its declared format
    MalformedInput,
    /// The declared format has no decoding path
    UnsupportedFormat,
    /// A parameter was declared but no input was submitted for it
    MissingParameterValue,
    /// Configuration could not be loaded
    Config,
}

impl GeoparamError {
    /// Build a malformed-input error for the given format name
    pub fn malformed(format: impl Into<String>, reason: impl Into<String>) -> Self {
        GeoparamError::MalformedInput {
            format: format.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoparamError::MalformedInput { .. } => ErrorKind::MalformedInput,
            GeoparamError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            GeoparamError::MissingParameterValue { .. } => ErrorKind::MissingParameterValue,
            GeoparamError::ConfigInvalid { .. } => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoparamError>;
