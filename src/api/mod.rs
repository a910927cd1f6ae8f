//! Client for the expense backend's JSON actions
//!
//! Every call is a POST of `{ "action": ..., ... }` answered with a
//! `{ success, data, error }` envelope. Receipt images travel as a raw
//! base64 JPEG in `imageBase64`.

pub mod cached;
pub mod client;
pub mod types;

pub use cached::CachedBackend;
pub use client::{AppsScriptClient, BackendClient};
pub use types::{ReceiptFields, ResourceQuery, SaveReceiptResponse};
