//! Core trait for the key-value persistence backends.

use chrono::{DateTime, Utc};
use color_eyre::Result;

/// A value read back from storage, with the time it was written.
#[derive(Debug, Clone)]
pub struct StoredValue {
  /// Raw JSON text as stored
  pub value: String,
  /// When the value was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for key-value storage backends.
///
/// Values are JSON strings; interpretation is left to the typed layer on
/// top. Two implementations exist: a SQLite backend that survives restarts
/// (the durable cache) and an in-memory backend scoped to the process (the
/// session cache).
pub trait KvStorage: Send + Sync {
  /// Read a value by key, or None if it was never stored.
  fn get(&self, key: &str) -> Result<Option<StoredValue>>;

  /// Write a value under a key, replacing any previous value.
  fn put(&self, key: &str, value: &str) -> Result<()>;

  /// Delete a key. Deleting an absent key is not an error.
  fn remove(&self, key: &str) -> Result<()>;
}
