//! Key-value persistence for quotes and view state.
//!
//! Two backends behind one trait: SQLite for state that must survive
//! restarts (the quote collection, the category filter) and an in-memory
//! map for state scoped to one session (the last displayed quote).

mod layer;
pub mod storage;
mod traits;

pub use layer::{seed_quotes, QuoteCache};
pub use storage::{MemoryStorage, SqliteStorage};
