//! Console frontend: the thin render/notice surface the core talks to.
//!
//! Deliberately dumb glue. Everything here is a sink for already-decided
//! output; no state, no decisions.

use crate::commands::COMMANDS;
use crate::store::Quote;

/// Render a single quote.
pub fn render_quote(quote: &Quote) {
  println!("\"{}\" — {}", quote.text, quote.category);
}

/// Render the empty-store state.
pub fn render_empty() {
  println!("No quotes available. Please add one!");
}

/// Render the zero-match state for a category filter.
pub fn render_no_match(category: &str) {
  println!("No quotes in category '{}'.", category);
}

/// Render a user-facing notice (validation errors, sync notices).
pub fn notice(message: &str) {
  println!("{}", message);
}

/// Render the visible conflict notice after a server-wins overwrite.
pub fn conflict_notice() {
  println!("Remote data differed from local; the server version was applied.");
  println!("Type 'resolve remote' to confirm or 'resolve local' to keep what is shown now.");
}

/// Render the full quote list.
pub fn render_list(quotes: &[Quote]) {
  if quotes.is_empty() {
    render_empty();
    return;
  }
  for (index, quote) in quotes.iter().enumerate() {
    println!("{:>3}. \"{}\" — {}", index + 1, quote.text, quote.category);
  }
}

/// Render the command list.
pub fn render_help() {
  println!("Commands:");
  for cmd in COMMANDS {
    if cmd.aliases.is_empty() {
      println!("  {:<12} {}", cmd.name, cmd.description);
    } else {
      println!("  {:<12} {} (aliases: {})", cmd.name, cmd.description, cmd.aliases.join(", "));
    }
  }
}
