//! Encoded JPEG output and its transport forms

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::codec::Quality;
use super::geometry::Dimensions;

pub const JPEG_MIME: &str = "image/jpeg";

/// A rendered preview: JPEG bytes plus the parameters that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
    pub quality: Quality,
    pub grayscale: bool,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw base64 payload, as sent in the `imageBase64` field
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/jpeg;base64,...` form for display
    pub fn to_data_url(&self) -> String {
        format!("data:{JPEG_MIME};base64,{}", self.to_base64())
    }
}

/// Drop a `data:<mime>;base64,` prefix if present
pub fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}

/// Decode a base64 payload, with or without a data-URL prefix
pub fn decode_payload(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(strip_data_url_prefix(data).trim())
}
