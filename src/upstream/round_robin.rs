//! Round-robin selection cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector.
/// Stores an internal counter to rotate through a fixed set of slots.
///
/// Every call takes a distinct counter value with a single atomic `fetch_add`,
/// so any `len` consecutive calls land on `len` distinct slots no matter how
/// callers interleave.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the next slot in `0..len`.
    ///
    /// # Panics
    /// Panics if `len` is zero. Pools are never built empty.
    pub fn next_index(&self, len: usize) -> usize {
        assert!(len > 0, "round robin over an empty set");
        // Only uniqueness of the counter value matters, not ordering with other memory.
        self.counter.fetch_add(1, Ordering::Relaxed) % len
    }
}
