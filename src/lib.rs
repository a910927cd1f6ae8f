//! Response caching and receipt image preparation for the expense backend client.
//!
//! - [`cache`]: TTL-bounded response cache with an injectable clock
//! - [`imaging`]: downscale, crop, grayscale and JPEG encode of receipt photos
//! - [`api`]: typed client for the backend's JSON actions, with cache-through reads

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod imaging;
pub mod observability;
