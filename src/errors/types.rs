//! Error type definitions for receipt-kit
//!
//! Errors are hierarchical: the pipeline and the backend client each have
//! their own enum, and both convert into [`AppError`] with `?`.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Receipt image pipeline errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Backend client errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receipt image pipeline errors
///
/// All of these are recoverable: the editing session keeps its last good
/// preview whenever one is returned.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The source bytes could not be decoded (corrupt or unsupported file)
    #[error("Failed to process image: {message}")]
    SourceLoad { message: String },

    /// The encoder could not produce output
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Crop selection below the minimum selectable size
    #[error("Crop selection too small: {width}x{height} (minimum {min}x{min})")]
    CropTooSmall { width: u32, height: u32, min: u32 },

    /// Displayed or source geometry that cannot be mapped (zero-sized)
    #[error("Invalid dimensions: {message}")]
    InvalidDimensions { message: String },
}

/// Backend client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Endpoint URL missing or malformed
    #[error("Invalid endpoint: {url} - {message}")]
    InvalidEndpoint { url: String, message: String },

    /// Transport-level failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered with `success: false`
    #[error("Backend rejected {action}: {message}")]
    Rejected { action: String, message: String },

    /// The backend answered successfully but without a payload
    #[error("Backend returned no data for {action}")]
    MissingData { action: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl ImageError {
    pub fn source_load<S: Into<String>>(message: S) -> Self {
        Self::SourceLoad {
            message: message.into(),
        }
    }

    pub fn encode<S: Into<String>>(message: S) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub fn invalid_dimensions<S: Into<String>>(message: S) -> Self {
        Self::InvalidDimensions {
            message: message.into(),
        }
    }

    /// True for errors caused by the user's selection rather than the image
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::CropTooSmall { .. } | Self::InvalidDimensions { .. })
    }
}

impl ApiError {
    pub fn rejected<A: Into<String>, M: Into<String>>(action: A, message: M) -> Self {
        Self::Rejected {
            action: action.into(),
            message: message.into(),
        }
    }
}
