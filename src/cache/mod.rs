//! Time-bounded response cache for backend API calls
//!
//! The backend has high latency and no push invalidation, so list/detail
//! responses are kept for a short TTL and reused across views:
//!
//! - Explicitly constructed store, shared through `Arc`, no global state
//! - Lazy expiry: stale entries are dropped when read, never swept
//! - Injectable [`Clock`] so TTL behaviour is deterministic in tests
//! - No size bound; the key space is small and session-scoped

pub mod clock;
pub mod entry;
pub mod keys;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keys::CacheKey;
pub use service::{CacheStats, ResponseCache};
