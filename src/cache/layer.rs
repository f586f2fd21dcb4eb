//! Typed layer over the raw key-value backends.
//!
//! Knows the fixed keys and their JSON shapes:
//! - `quotes` -> JSON array of `{text, category}`
//! - `selectedCategory` -> JSON string
//! - `lastQuote` -> JSON object `{text, category}`
//!
//! Corrupt stored JSON is never fatal: it is logged and the built-in
//! default takes over, so a damaged cache cannot prevent startup.

use color_eyre::Result;
use tracing::{debug, warn};

use super::traits::KvStorage;
use crate::select::ALL_CATEGORIES;
use crate::store::Quote;

pub const KEY_QUOTES: &str = "quotes";
pub const KEY_SELECTED_CATEGORY: &str = "selectedCategory";
pub const KEY_LAST_QUOTE: &str = "lastQuote";

/// The three quotes every fresh installation starts with.
pub fn seed_quotes() -> Vec<Quote> {
  vec![
    Quote::new(
      "The best way to get started is to quit talking and begin doing.",
      "Motivation",
    ),
    Quote::new("Don't let yesterday take up too much of today.", "Inspiration"),
    Quote::new(
      "Failure is not the opposite of success, it's part of success.",
      "Wisdom",
    ),
  ]
}

/// Typed cache over a storage backend.
pub struct QuoteCache<S: KvStorage> {
  storage: S,
}

impl<S: KvStorage> QuoteCache<S> {
  pub fn new(storage: S) -> Self {
    Self { storage }
  }

  /// Persist the full quote collection.
  pub fn save_quotes(&self, quotes: &[Quote]) -> Result<()> {
    let json = serde_json::to_string(quotes)?;
    self.storage.put(KEY_QUOTES, &json)
  }

  /// Load the stored collection, or the seed quotes if nothing was stored
  /// or the stored value no longer parses.
  pub fn load_quotes(&self) -> Result<Vec<Quote>> {
    match self.storage.get(KEY_QUOTES)? {
      Some(stored) => match serde_json::from_str(&stored.value) {
        Ok(quotes) => {
          debug!("Loaded stored quotes (cached at {})", stored.cached_at);
          Ok(quotes)
        }
        Err(e) => {
          warn!("Stored quotes are corrupt, falling back to seed quotes: {}", e);
          Ok(seed_quotes())
        }
      },
      None => Ok(seed_quotes()),
    }
  }

  pub fn save_selected_category(&self, category: &str) -> Result<()> {
    let json = serde_json::to_string(category)?;
    self.storage.put(KEY_SELECTED_CATEGORY, &json)
  }

  /// Load the persisted category filter, defaulting to the `all` sentinel.
  pub fn load_selected_category(&self) -> Result<String> {
    match self.storage.get(KEY_SELECTED_CATEGORY)? {
      Some(stored) => match serde_json::from_str(&stored.value) {
        Ok(category) => Ok(category),
        Err(e) => {
          warn!("Stored category filter is corrupt, falling back to '{}': {}", ALL_CATEGORIES, e);
          Ok(ALL_CATEGORIES.to_string())
        }
      },
      None => Ok(ALL_CATEGORIES.to_string()),
    }
  }

  /// Remember the most recently displayed quote (session cache).
  pub fn save_last_quote(&self, quote: &Quote) -> Result<()> {
    let json = serde_json::to_string(quote)?;
    self.storage.put(KEY_LAST_QUOTE, &json)
  }

  /// The most recently displayed quote, if any was recorded this session.
  pub fn load_last_quote(&self) -> Result<Option<Quote>> {
    match self.storage.get(KEY_LAST_QUOTE)? {
      Some(stored) => match serde_json::from_str(&stored.value) {
        Ok(quote) => Ok(Some(quote)),
        Err(e) => {
          warn!("Stored last quote is corrupt, ignoring: {}", e);
          Ok(None)
        }
      },
      None => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::{MemoryStorage, SqliteStorage};

  #[test]
  fn test_load_quotes_defaults_to_seeds() {
    let cache = QuoteCache::new(SqliteStorage::open_in_memory().unwrap());
    let quotes = cache.load_quotes().unwrap();
    assert_eq!(quotes, seed_quotes());
  }

  #[test]
  fn test_save_then_load_roundtrip() {
    let cache = QuoteCache::new(SqliteStorage::open_in_memory().unwrap());
    let quotes = vec![Quote::new("persisted", "Test")];
    cache.save_quotes(&quotes).unwrap();
    assert_eq!(cache.load_quotes().unwrap(), quotes);
  }

  #[test]
  fn test_add_survives_reload() {
    // The testable property: add followed by a cache reload yields a
    // collection containing the added pair.
    let storage = SqliteStorage::open_in_memory().unwrap();
    let cache = QuoteCache::new(storage);

    let mut quotes = cache.load_quotes().unwrap();
    quotes.push(Quote::new("fresh", "Test"));
    cache.save_quotes(&quotes).unwrap();

    let reloaded = cache.load_quotes().unwrap();
    assert!(reloaded.contains(&Quote::new("fresh", "Test")));
  }

  #[test]
  fn test_corrupt_quotes_fall_back_to_seeds() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put(KEY_QUOTES, "{not json").unwrap();
    let cache = QuoteCache::new(storage);
    assert_eq!(cache.load_quotes().unwrap(), seed_quotes());
  }

  #[test]
  fn test_selected_category_defaults_to_all() {
    let cache = QuoteCache::new(MemoryStorage::new());
    assert_eq!(cache.load_selected_category().unwrap(), ALL_CATEGORIES);

    cache.save_selected_category("Wisdom").unwrap();
    assert_eq!(cache.load_selected_category().unwrap(), "Wisdom");
  }

  #[test]
  fn test_last_quote_session_roundtrip() {
    let cache = QuoteCache::new(MemoryStorage::new());
    assert!(cache.load_last_quote().unwrap().is_none());

    let quote = Quote::new("shown", "Session");
    cache.save_last_quote(&quote).unwrap();
    assert_eq!(cache.load_last_quote().unwrap(), Some(quote));
  }
}
