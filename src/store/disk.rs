//! Persistent object store backed by redb.
//!
//! Puts are committed with eventual durability so each cache fill costs one
//! transaction but no fsync. `sync` commits an immediate-durability transaction,
//! which makes every earlier eventual commit persistent.
//!
//! redb only reclaims pages freed by eventual commits after a durable one, so
//! puts are checkpointed with immediate durability every
//! [`CHECKPOINT_INTERVAL`] puts, or once `segment_size` bytes have been written
//! since the last checkpoint. The segment size never limits how much is stored;
//! capacity is left to the engine.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use redb::{Database, Durability, TableDefinition};

use crate::store::{CacheStore, StoreError, StoreLimits};

/// Key: request path, Value: object body.
const OBJECTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("objects");

/// File name of the database inside the configured data directory.
pub const DATABASE_FILE: &str = "objects.redb";

/// Puts between two durable checkpoints.
pub const CHECKPOINT_INTERVAL: u64 = 64;

/// Decides which puts commit with immediate durability.
#[derive(Debug)]
struct Checkpoint {
    puts: AtomicU64,
    bytes: AtomicU64,
    segment_size: u64,
}

impl Checkpoint {
    fn new(segment_size: u64) -> Self {
        Self {
            puts: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            segment_size,
        }
    }

    /// Account for a put of `size` bytes. True if it should be durable.
    fn record(&self, size: u64) -> bool {
        let puts = self.puts.fetch_add(1, Ordering::Relaxed) + 1;
        let bytes = self.bytes.fetch_add(size, Ordering::Relaxed).saturating_add(size);
        if puts >= CHECKPOINT_INTERVAL || bytes >= self.segment_size {
            self.puts.store(0, Ordering::Relaxed);
            self.bytes.store(0, Ordering::Relaxed);
            return true;
        }
        false
    }
}

/// Persistent cache store in a single redb file.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
    file: PathBuf,
    limits: StoreLimits,
    checkpoint: Arc<Checkpoint>,
}

fn engine<E: Display>(e: E) -> StoreError {
    StoreError::Engine(e.to_string())
}

impl RedbStore {
    /// Create or open the store inside `dir`.
    ///
    /// Creates the directory and database file if they don't exist.
    /// `segment_size` is the number of bytes written between durable checkpoints.
    pub fn open(
        dir: impl AsRef<Path>,
        limits: StoreLimits,
        segment_size: u64,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let file = dir.join(DATABASE_FILE);

        let db = Database::create(&file).map_err(engine)?;

        // Make sure the table exists so readers never see TableDoesNotExist.
        let write_txn = db.begin_write().map_err(engine)?;
        {
            write_txn.open_table(OBJECTS_TABLE).map_err(engine)?;
        }
        write_txn.commit().map_err(engine)?;

        tracing::info!(path = %file.display(), "Storage opened");

        Ok(Self {
            db: Arc::new(db),
            file,
            limits,
            checkpoint: Arc::new(Checkpoint::new(segment_size)),
        })
    }

    /// Path of the database file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    fn get_blocking(db: &Database, key: &str) -> Result<Option<Bytes>, StoreError> {
        let read_txn = db.begin_read().map_err(engine)?;
        let table = read_txn.open_table(OBJECTS_TABLE).map_err(engine)?;
        let value = table
            .get(key)
            .map_err(engine)?
            .map(|guard| Bytes::copy_from_slice(guard.value()));
        Ok(value)
    }

    fn put_blocking(
        db: &Database,
        key: &str,
        value: &[u8],
        durability: Durability,
    ) -> Result<(), StoreError> {
        let mut write_txn = db.begin_write().map_err(engine)?;
        write_txn.set_durability(durability);
        {
            let mut table = write_txn.open_table(OBJECTS_TABLE).map_err(engine)?;
            table.insert(key, value).map_err(engine)?;
        }
        write_txn.commit().map_err(engine)?;
        Ok(())
    }

    fn sync_blocking(db: &Database) -> Result<(), StoreError> {
        let mut write_txn = db.begin_write().map_err(engine)?;
        write_txn.set_durability(Durability::Immediate);
        write_txn.commit().map_err(engine)?;
        Ok(())
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("file", &self.file)
            .field("limits", &self.limits)
            .field("segment_size", &self.checkpoint.segment_size)
            .finish()
    }
}

#[async_trait]
impl CacheStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.limits.check_key(key)?;
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::get_blocking(&db, &key)).await?
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.limits.check_entry(key, &value)?;
        let durability = if self.checkpoint.record(value.len() as u64) {
            Durability::Immediate
        } else {
            Durability::Eventual
        };
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::put_blocking(&db, &key, &value, durability))
            .await?
    }

    async fn sync(&self) -> Result<(), StoreError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || Self::sync_blocking(&db)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path) -> RedbStore {
        RedbStore::open(dir, StoreLimits::default(), 2 * 1024 * 1024 * 1024).unwrap()
    }

    #[tokio::test]
    async fn test_put_get_roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path());
            assert!(store.get("/cat.jpg").await.unwrap().is_none());
            store
                .put("/cat.jpg", Bytes::from_static(b"\xff\xd8jpeg"))
                .await
                .unwrap();
            store.sync().await.unwrap();
        }

        let store = open(dir.path());
        let value = store.get("/cat.jpg").await.unwrap().unwrap();
        assert_eq!(&value[..], b"\xff\xd8jpeg");
    }

    #[tokio::test]
    async fn test_creates_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = open(&nested);
        assert!(store.file().exists());
    }

    #[tokio::test]
    async fn test_oversized_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(
            dir.path(),
            StoreLimits {
                max_key_size: 8,
                max_value_size: 1024,
            },
            u64::MAX,
        )
        .unwrap();

        let key = "/a/very/long/key.png";
        assert!(matches!(
            store.put(key, Bytes::from_static(b"x")).await,
            Err(StoreError::KeyTooLarge { .. })
        ));
        assert!(store.get(key).await.is_err());
    }

    #[tokio::test]
    async fn test_writing_past_segment_size_keeps_accepting_puts() {
        let dir = tempfile::tempdir().unwrap();
        let segment_size = 256 * 1024;
        let store = RedbStore::open(dir.path(), StoreLimits::default(), segment_size).unwrap();
        let body = Bytes::from(vec![0x5a; 64 * 1024]);

        // 12.5 MiB, fifty times the segment size.
        for i in 0..200 {
            store.put(&format!("/{}.jpg", i), body.clone()).await.unwrap();
        }
        for i in [0, 99, 199] {
            let value = store.get(&format!("/{}.jpg", i)).await.unwrap().unwrap();
            assert_eq!(value.len(), body.len());
        }
    }

    #[test]
    fn test_checkpoint_every_interval_puts() {
        let checkpoint = Checkpoint::new(u64::MAX);
        let durable: Vec<u64> = (1..=2 * CHECKPOINT_INTERVAL)
            .filter(|_| checkpoint.record(10))
            .collect();
        assert_eq!(durable, vec![CHECKPOINT_INTERVAL, 2 * CHECKPOINT_INTERVAL]);
    }

    #[test]
    fn test_checkpoint_after_segment_size_bytes() {
        let checkpoint = Checkpoint::new(100);
        assert!(!checkpoint.record(60));
        assert!(checkpoint.record(60));
        // Counters restart after a checkpoint.
        assert!(!checkpoint.record(60));
    }
}
