/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Cache defaults
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

// Image pipeline defaults
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;
pub const MIN_JPEG_QUALITY: f32 = 0.3;
pub const MAX_JPEG_QUALITY: f32 = 1.0;
pub const DEFAULT_MIN_CROP_SIZE: u32 = 10;

// Backend defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Config loading
pub const DEFAULT_CONFIG_FILE: &str = "receipt-kit.toml";
pub const ENV_PREFIX: &str = "RECEIPT_KIT_";
