//! Centralized error handling for receipt-kit
//!
//! This module unifies the error types of the image pipeline, the backend
//! client and configuration loading under a single [`AppError`].
//!
//! # Error Categories
//!
//! - **Image Errors**: source decoding, JPEG encoding, crop validation
//! - **API Errors**: backend endpoint, transport and envelope failures
//! - **Configuration Errors**: invalid or unreadable settings
//!
//! The response cache has no error states; a miss is the only signal.
//!
//! # Usage
//!
//! ```rust
//! use receipt_kit::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for image pipeline Results
pub type ImageResult<T> = Result<T, ImageError>;

/// Convenience type alias for backend client Results
pub type ApiResult<T> = Result<T, ApiError>;
