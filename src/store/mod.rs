//! Object storage subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → CacheStore::get(key)   (miss or lookup error → fetch from origin)
//!     → CacheStore::put(key)   (only after a verified 200 from origin)
//! Shutdown
//!     → CacheStore::sync()     (durability barrier, exactly once)
//! ```
//!
//! # Design Decisions
//! - The handler only sees the `CacheStore` trait; backends are swappable
//! - Keys are request paths used verbatim, values are opaque bytes
//! - Size limits are enforced here, not by the handler
//! - Blocking engines move their I/O onto the blocking thread pool

pub mod memory;
pub mod disk;

use async_trait::async_trait;
use bytes::Bytes;

pub use self::memory::MemoryStore;
pub use self::disk::RedbStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key is {size} bytes, limit is {limit}")]
    KeyTooLarge { size: usize, limit: u64 },
    #[error("value is {size} bytes, limit is {limit}")]
    ValueTooLarge { size: usize, limit: u64 },
    #[error("storage engine error: {0}")]
    Engine(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Limits applied to every stored entry.
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub max_key_size: u64,
    pub max_value_size: u64,
}

impl StoreLimits {
    /// Reject keys longer than the configured limit.
    pub fn check_key(&self, key: &str) -> Result<(), StoreError> {
        if key.len() as u64 > self.max_key_size {
            return Err(StoreError::KeyTooLarge {
                size: key.len(),
                limit: self.max_key_size,
            });
        }
        Ok(())
    }

    /// Reject a key/value pair that exceeds either limit.
    pub fn check_entry(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_key(key)?;
        if value.len() as u64 > self.max_value_size {
            return Err(StoreError::ValueTooLarge {
                size: value.len(),
                limit: self.max_value_size,
            });
        }
        Ok(())
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_key_size: 200,
            max_value_size: 10 * 1024 * 1024,
        }
    }
}

/// Key-value store holding cached objects.
///
/// Implementations must be safe for concurrent `get`/`put` from many requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a cached object. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Store an object, replacing any previous value.
    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Flush everything written so far to durable storage.
    async fn sync(&self) -> Result<(), StoreError>;
}
