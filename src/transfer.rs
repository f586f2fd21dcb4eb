//! File export and import of the quote collection.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::path::Path;

use crate::store::Quote;

/// Default file name for exports.
pub const EXPORT_FILE: &str = "quotes.json";

/// Write the collection as a pretty-printed JSON array.
pub fn export_quotes(path: &Path, quotes: &[Quote]) -> Result<()> {
  let json = serde_json::to_string_pretty(quotes)?;
  std::fs::write(path, json)
    .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
  Ok(())
}

/// Read a JSON file of quotes. The top level must be an array; anything
/// else, or unparseable JSON, is a user-visible error. Entries that do
/// not carry non-empty `text` and `category` fields fail the whole file.
pub fn import_quotes(path: &Path) -> Result<Vec<Quote>> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;

  let value: Value = serde_json::from_str(&contents)
    .map_err(|e| eyre!("{} is not valid JSON: {}", path.display(), e))?;

  if !value.is_array() {
    return Err(eyre!("{} must contain a JSON array of quotes", path.display()));
  }

  let quotes: Vec<Quote> = serde_json::from_value(value)
    .map_err(|e| eyre!("{} has an entry that is not a quote: {}", path.display(), e))?;

  Ok(quotes)
}
