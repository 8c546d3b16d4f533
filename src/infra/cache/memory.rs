use std::time::Duration;

use crate::contracts;
use anyhow::Result;
use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use tokio::time::Instant;

/// Upper bound on the number of keys kept when no capacity is configured.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
  value: Vec<u8>,
  ttl: Duration,
  expires_at: Instant,
}

/// Lets every entry carry the ttl it was stored with.
struct EntryExpiry;

impl Expiry<Vec<u8>, Entry> for EntryExpiry {
  fn expire_after_create(
    &self,
    _key: &Vec<u8>,
    entry: &Entry,
    _created_at: std::time::Instant,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }

  fn expire_after_update(
    &self,
    _key: &Vec<u8>,
    entry: &Entry,
    _updated_at: std::time::Instant,
    _duration_until_expiry: Option<Duration>,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }
}

/// In process cache bounded by `max_capacity` keys.
///
/// moka evicts expired and least used entries in the background. The deadline
/// kept next to each value is checked on read as well, so tokio's paused clock
/// can drive expiry in tests.
pub struct MemoryCache {
  entries: Cache<Vec<u8>, Entry>,
}

impl MemoryCache {
  pub fn new() -> Self {
    Self::with_max_capacity(DEFAULT_MAX_ENTRIES)
  }

  pub fn with_max_capacity(max_capacity: u64) -> Self {
    let entries = Cache::builder()
      .max_capacity(max_capacity)
      .expire_after(EntryExpiry)
      .build();

    Self { entries }
  }
}

#[async_trait]
impl contracts::cache::Cache for MemoryCache {
  #[tracing::instrument(name = "MemoryCache::get", skip_all, fields(key = %String::from_utf8_lossy(key)))]
  async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let entry = match self.entries.get(key).await {
      None => return Ok(None),
      Some(entry) => entry,
    };

    if entry.expires_at <= Instant::now() {
      self.entries.invalidate(key).await;
      return Ok(None);
    }

    Ok(Some(entry.value))
  }

  #[tracing::instrument(name = "MemoryCache::put", skip_all, fields(key = %String::from_utf8_lossy(&key)))]
  async fn put(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> Result<()> {
    let entry = Entry {
      value,
      ttl,
      expires_at: Instant::now() + ttl,
    };
    self.entries.insert(key, entry).await;
    Ok(())
  }
}
