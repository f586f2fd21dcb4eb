//! The authoritative in-memory quote collection.
//!
//! The store is the single writable owner of the quote list. All mutation
//! goes through the app reducer, which persists to the durable cache after
//! every change, so the store itself carries no persistence logic.

use serde::{Deserialize, Serialize};

/// A single quote record. Equality is structural; there is no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
  pub text: String,
  pub category: String,
}

impl Quote {
  pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      category: category.into(),
    }
  }
}

/// Ordered collection of quotes. Insertion order is preserved for display;
/// duplicates are permitted.
#[derive(Debug, Default, Clone)]
pub struct QuoteStore {
  quotes: Vec<Quote>,
}

impl QuoteStore {
  pub fn new(quotes: Vec<Quote>) -> Self {
    Self { quotes }
  }

  /// Append a single quote. Validation (non-empty fields) happens in the
  /// command layer before this is reached.
  pub fn add(&mut self, quote: Quote) {
    self.quotes.push(quote);
  }

  /// Append a batch of quotes (import path).
  pub fn extend(&mut self, batch: Vec<Quote>) {
    self.quotes.extend(batch);
  }

  /// Atomically swap the entire collection.
  pub fn replace_all(&mut self, quotes: Vec<Quote>) {
    self.quotes = quotes;
  }

  pub fn all(&self) -> &[Quote] {
    &self.quotes
  }

  pub fn len(&self) -> usize {
    self.quotes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.quotes.is_empty()
  }

  /// Distinct category values in first-seen order.
  pub fn categories(&self) -> Vec<String> {
    let mut seen = Vec::new();
    for quote in &self.quotes {
      if !seen.iter().any(|c| c == &quote.category) {
        seen.push(quote.category.clone());
      }
    }
    seen
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store_with(pairs: &[(&str, &str)]) -> QuoteStore {
    QuoteStore::new(pairs.iter().map(|(t, c)| Quote::new(*t, *c)).collect())
  }

  #[test]
  fn test_add_appends_in_order() {
    let mut store = QuoteStore::default();
    store.add(Quote::new("a", "x"));
    store.add(Quote::new("b", "y"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.all()[0].text, "a");
    assert_eq!(store.all()[1].text, "b");
  }

  #[test]
  fn test_duplicates_permitted() {
    let mut store = QuoteStore::default();
    store.add(Quote::new("a", "x"));
    store.add(Quote::new("a", "x"));
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn test_replace_all_swaps_collection() {
    let mut store = store_with(&[("a", "x"), ("b", "y")]);
    store.replace_all(vec![Quote::new("c", "z")]);
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].text, "c");
  }

  #[test]
  fn test_categories_distinct_first_seen_order() {
    let store = store_with(&[("a", "x"), ("b", "y"), ("c", "x"), ("d", "z")]);
    assert_eq!(store.categories(), vec!["x", "y", "z"]);
  }

  #[test]
  fn test_extend_appends_batch() {
    let mut store = store_with(&[("a", "x")]);
    store.extend(vec![Quote::new("b", "y"), Quote::new("c", "z")]);
    assert_eq!(store.len(), 3);
    assert_eq!(store.all()[2].text, "c");
  }
}
