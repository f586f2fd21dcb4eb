//! Category filtering and random quote selection.

use rand::Rng;

use crate::store::Quote;

/// Sentinel filter value meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "all";

/// Pick one quote uniformly at random from those matching the filter.
///
/// The `all` sentinel matches every quote. Returns `None` when nothing
/// matches, which the frontend renders as the "no quotes in this category"
/// state. A persisted category that no longer matches any quote simply
/// behaves as a zero-match filter; it is not rewritten.
pub fn pick_random<'a>(quotes: &'a [Quote], filter: &str) -> Option<&'a Quote> {
  let matching: Vec<&Quote> = quotes
    .iter()
    .filter(|q| filter == ALL_CATEGORIES || q.category == filter)
    .collect();

  if matching.is_empty() {
    return None;
  }

  let index = rand::thread_rng().gen_range(0..matching.len());
  Some(matching[index])
}
