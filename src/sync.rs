//! Reconciliation between the local store and remote snapshots.
//!
//! Policy: server wins by default. When a fetched snapshot differs from
//! the local collection the caller swaps the store to the snapshot,
//! persists it, and a conflict stays pending until the user picks a side.
//! "Keep local" cannot restore what the automatic overwrite already
//! replaced; it only decides what the next persisted state is.
//!
//! Fetches are guarded: at most one in flight, and a completed fetch is
//! dropped if a newer one has already been applied, so a slow response
//! can never overwrite a fresher snapshot.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::store::Quote;

/// What a completed reconciliation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
  /// Local and remote were structurally equal; nothing changed.
  InSync,
  /// Remote differed; the store must be replaced with this snapshot.
  Replaced(Vec<Quote>),
}

/// The user's answer to a pending conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  KeepLocal,
  KeepRemote,
}

/// Tracks snapshot state, the pending-conflict flag, and fetch ordering.
#[derive(Debug, Default)]
pub struct Reconciler {
  /// Most recent remote snapshot, kept to support a later "keep remote".
  last_snapshot: Option<Vec<Quote>>,
  pending_conflict: bool,
  /// Generation handed to the next fetch.
  next_generation: u64,
  /// Generation of the fetch currently in flight, if any.
  in_flight: Option<u64>,
  /// Generation of the newest snapshot that was accepted.
  last_applied: u64,
}

impl Reconciler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Begin a fetch cycle. Returns the generation to tag the fetch with,
  /// or None when a fetch is already in flight and this cycle is skipped.
  pub fn begin_fetch(&mut self) -> Option<u64> {
    if self.in_flight.is_some() {
      debug!("Sync fetch already in flight, skipping cycle");
      return None;
    }
    self.next_generation += 1;
    self.in_flight = Some(self.next_generation);
    Some(self.next_generation)
  }

  /// Record a failed fetch so the next cycle may start.
  pub fn fetch_failed(&mut self, generation: u64) {
    if self.in_flight == Some(generation) {
      self.in_flight = None;
    }
  }

  /// Reconcile a fetched snapshot against the local collection.
  ///
  /// Returns None when the snapshot is stale (an equal-or-newer one was
  /// already applied). Otherwise compares canonical fingerprints: equal
  /// means in sync, different means server-wins replacement plus a
  /// pending conflict for the user to confirm or override.
  pub fn reconcile(
    &mut self,
    generation: u64,
    local: &[Quote],
    remote: Vec<Quote>,
  ) -> Option<SyncOutcome> {
    if self.in_flight == Some(generation) {
      self.in_flight = None;
    }
    if generation <= self.last_applied {
      debug!("Dropping stale sync response (generation {})", generation);
      return None;
    }
    self.last_applied = generation;

    let in_sync = fingerprint(local) == fingerprint(&remote);
    self.last_snapshot = Some(remote.clone());

    if in_sync {
      Some(SyncOutcome::InSync)
    } else {
      self.pending_conflict = true;
      Some(SyncOutcome::Replaced(remote))
    }
  }

  /// Apply the user's resolution choice and clear the pending flag.
  ///
  /// Returns the snapshot to (re-)apply for "keep remote" (idempotent if
  /// the automatic overwrite already ran); None for "keep local", where
  /// the caller persists whatever the store currently holds.
  pub fn resolve(&mut self, resolution: Resolution) -> Option<Vec<Quote>> {
    self.pending_conflict = false;
    match resolution {
      Resolution::KeepRemote => self.last_snapshot.clone(),
      Resolution::KeepLocal => None,
    }
  }

  pub fn pending_conflict(&self) -> bool {
    self.pending_conflict
  }

  pub fn last_snapshot(&self) -> Option<&[Quote]> {
    self.last_snapshot.as_deref()
  }
}

/// Canonical comparable form of a collection: SHA-256 over its
/// order-sensitive JSON serialization.
pub fn fingerprint(quotes: &[Quote]) -> String {
  let json = serde_json::to_string(quotes).unwrap_or_default();
  let mut hasher = Sha256::new();
  hasher.update(json.as_bytes());
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn quotes(pairs: &[(&str, &str)]) -> Vec<Quote> {
    pairs.iter().map(|(t, c)| Quote::new(*t, *c)).collect()
  }

  fn server_quotes(titles: &[&str]) -> Vec<Quote> {
    titles.iter().map(|t| Quote::new(*t, "Server")).collect()
  }

  #[test]
  fn test_fingerprint_is_order_sensitive() {
    let a = quotes(&[("a", "x"), ("b", "y")]);
    let b = quotes(&[("b", "y"), ("a", "x")]);
    assert_ne!(fingerprint(&a), fingerprint(&b));
    assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
  }

  #[test]
  fn test_equal_snapshot_means_in_sync() {
    let mut reconciler = Reconciler::new();
    let local = quotes(&[("a", "x")]);

    let generation = reconciler.begin_fetch().unwrap();
    let outcome = reconciler.reconcile(generation, &local, local.clone());

    assert_eq!(outcome, Some(SyncOutcome::InSync));
    assert!(!reconciler.pending_conflict());
  }

  #[test]
  fn test_differing_snapshot_replaces_and_flags() {
    let mut reconciler = Reconciler::new();
    let local = quotes(&[("The best way...", "Motivation")]);
    let remote = server_quotes(&["t1", "t2", "t3", "t4", "t5"]);

    let generation = reconciler.begin_fetch().unwrap();
    let outcome = reconciler.reconcile(generation, &local, remote.clone());

    assert_eq!(outcome, Some(SyncOutcome::Replaced(remote)));
    assert!(reconciler.pending_conflict());
  }

  #[test]
  fn test_keep_remote_is_idempotent() {
    let mut reconciler = Reconciler::new();
    let local = quotes(&[("a", "x")]);
    let remote = server_quotes(&["t1"]);

    let generation = reconciler.begin_fetch().unwrap();
    reconciler.reconcile(generation, &local, remote.clone());

    let reapply = reconciler.resolve(Resolution::KeepRemote);
    assert_eq!(reapply, Some(remote));
    assert!(!reconciler.pending_conflict());
  }

  #[test]
  fn test_keep_local_does_not_restore_overwritten_data() {
    let mut reconciler = Reconciler::new();
    let local = quotes(&[("original", "Local")]);
    let remote = server_quotes(&["t1"]);

    let generation = reconciler.begin_fetch().unwrap();
    let outcome = reconciler.reconcile(generation, &local, remote.clone()).unwrap();

    // The automatic overwrite already happened; the store now holds the
    // remote snapshot.
    let store_contents = match outcome {
      SyncOutcome::Replaced(snapshot) => snapshot,
      SyncOutcome::InSync => unreachable!(),
    };

    // "Keep local" persists what the store currently holds, which is the
    // remote data, not the pre-overwrite collection. Lossy by design.
    assert_eq!(reconciler.resolve(Resolution::KeepLocal), None);
    assert!(!reconciler.pending_conflict());
    assert_eq!(store_contents, remote);
    assert_ne!(store_contents, local);
  }

  #[test]
  fn test_only_one_fetch_in_flight() {
    let mut reconciler = Reconciler::new();
    let generation = reconciler.begin_fetch().unwrap();
    assert!(reconciler.begin_fetch().is_none());

    reconciler.fetch_failed(generation);
    assert!(reconciler.begin_fetch().is_some());
  }

  #[test]
  fn test_stale_response_is_dropped() {
    let mut reconciler = Reconciler::new();
    let local = quotes(&[("a", "x")]);

    let old_generation = reconciler.begin_fetch().unwrap();
    // The slow fetch "fails over" the guard so a newer one can start.
    reconciler.fetch_failed(old_generation);
    let new_generation = reconciler.begin_fetch().unwrap();

    let newer = server_quotes(&["new"]);
    let outcome = reconciler.reconcile(new_generation, &local, newer.clone());
    assert!(matches!(outcome, Some(SyncOutcome::Replaced(_))));

    // The earlier fetch finally completes; its snapshot must not win.
    let older = server_quotes(&["old"]);
    assert_eq!(reconciler.reconcile(old_generation, &local, older), None);
    assert_eq!(reconciler.last_snapshot(), Some(newer.as_slice()));
  }
}
