//! Monotonic request generations for discarding stale renders

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one render request; later requests compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out generations and remembers the most recent one
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request; every earlier generation becomes stale
    pub fn next(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest(&self) -> Generation {
        Generation(self.latest.load(Ordering::Acquire))
    }

    /// True if no request has started since `generation`
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest() == generation
    }
}
