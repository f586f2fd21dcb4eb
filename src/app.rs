//! Application state and the single reducer every mutation flows through.
//!
//! The store, both caches, the remote client, and the reconciler are owned
//! here and injected nowhere else, so persistence can be triggered from one
//! place: any command or sync event that mutates the store ends with
//! `persist()`.

use color_eyre::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{MemoryStorage, QuoteCache, SqliteStorage};
use crate::commands::{self, ParsedCommand};
use crate::config::Config;
use crate::event::{Event, EventHandler, SyncEvent};
use crate::remote::RemoteClient;
use crate::select::{self, ALL_CATEGORIES};
use crate::store::{Quote, QuoteStore};
use crate::sync::{Reconciler, Resolution, SyncOutcome};
use crate::transfer;
use crate::ui;

/// Main application state
pub struct App {
  /// Authoritative quote collection
  store: QuoteStore,

  /// Durable mirror of the store and the category filter
  durable: QuoteCache<SqliteStorage>,

  /// Session-scoped cache for the last displayed quote
  session: QuoteCache<MemoryStorage>,

  /// Remote source client
  remote: RemoteClient,

  /// Snapshot comparison and conflict state
  reconciler: Reconciler,

  /// Current category filter ("all" = unrestricted)
  selected_category: String,

  config: Config,

  /// Event sender for background sync tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Ticks remaining until the next timer-driven sync
  ticks_until_sync: u64,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let durable = match &config.cache_path {
      Some(path) => QuoteCache::new(SqliteStorage::open_at(path)?),
      None => QuoteCache::new(SqliteStorage::open()?),
    };
    let session = QuoteCache::new(MemoryStorage::new());
    let remote = RemoteClient::new(&config)?;

    Self::with_parts(config, durable, session, remote)
  }

  /// Wire up an app from explicit parts. Tests use this with in-memory
  /// storage.
  pub fn with_parts(
    config: Config,
    durable: QuoteCache<SqliteStorage>,
    session: QuoteCache<MemoryStorage>,
    remote: RemoteClient,
  ) -> Result<Self> {
    let store = QuoteStore::new(durable.load_quotes()?);
    let selected_category = durable.load_selected_category()?;
    let (tx, _rx) = mpsc::unbounded_channel();

    info!(
      "Loaded {} quotes, category filter '{}'",
      store.len(),
      selected_category
    );

    Ok(Self {
      store,
      durable,
      session,
      remote,
      reconciler: Reconciler::new(),
      selected_category,
      config,
      event_tx: tx,
      ticks_until_sync: 0,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_secs(1));
    self.event_tx = events.sender();

    ui::notice("quotesync — type 'help' for commands.");

    self.render_initial_view()?;

    // First sync happens immediately; the tick handler reschedules.
    self.start_sync();
    self.ticks_until_sync = self.config.sync_interval_secs;

    while !self.should_quit {
      match events.next().await {
        Some(event) => {
          if let Err(e) = self.handle_event(event) {
            warn!("Command failed: {}", e);
            ui::notice(&format!("Error: {}", e));
          }
        }
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Input(line) => {
        let line = line.trim();
        if line.is_empty() {
          return Ok(());
        }
        match commands::parse(line) {
          Ok(command) => self.handle_command(command)?,
          Err(message) => ui::notice(&message),
        }
      }
      Event::InputClosed => self.should_quit = true,
      Event::Tick => self.handle_tick(),
      Event::Sync(sync_event) => self.handle_sync_event(sync_event)?,
      Event::Error(msg) => warn!("Background task error: {}", msg),
    }
    Ok(())
  }

  /// The single entry point for user-driven mutation.
  pub fn handle_command(&mut self, command: ParsedCommand) -> Result<()> {
    match command {
      ParsedCommand::Show => self.show_quote()?,

      ParsedCommand::Add { text, category } => {
        let quote = Quote::new(text, category);
        self.store.add(quote.clone());
        self.persist()?;
        // Best-effort transmit; local state is already settled.
        self.remote.spawn_push(quote);
        ui::notice("Quote added successfully!");
      }

      ParsedCommand::Filter { category } => {
        self.selected_category = category;
        self.durable.save_selected_category(&self.selected_category)?;
        self.show_quote()?;
      }

      ParsedCommand::Categories => {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        categories.extend(self.store.categories());
        ui::notice(&categories.join(", "));
      }

      ParsedCommand::List => ui::render_list(self.store.all()),

      ParsedCommand::Sync => self.start_sync(),

      ParsedCommand::Resolve(resolution) => self.resolve_conflict(resolution)?,

      ParsedCommand::Export { path } => {
        let path = path.unwrap_or_else(|| PathBuf::from(transfer::EXPORT_FILE));
        transfer::export_quotes(&path, self.store.all())?;
        ui::notice(&format!("Exported {} quotes to {}", self.store.len(), path.display()));
      }

      ParsedCommand::Import { path } => match transfer::import_quotes(&path) {
        Ok(batch) => {
          let count = batch.len();
          self.store.extend(batch);
          self.persist()?;
          ui::notice(&format!("Quotes imported successfully! ({} added)", count));
        }
        Err(e) => ui::notice(&format!("Import failed: {}", e)),
      },

      ParsedCommand::Help => ui::render_help(),

      ParsedCommand::Quit => self.should_quit = true,
    }
    Ok(())
  }

  /// Render the startup view. A fresh process has an empty session
  /// cache and gets a random pick; a pre-populated session (embedding,
  /// tests) gets its last displayed quote back without consulting the
  /// store.
  fn render_initial_view(&mut self) -> Result<()> {
    match self.session.load_last_quote()? {
      Some(quote) => {
        ui::render_quote(&quote);
        Ok(())
      }
      None => self.show_quote(),
    }
  }

  /// Pick and render a random quote under the current filter, recording
  /// it in the session cache.
  fn show_quote(&mut self) -> Result<()> {
    match select::pick_random(self.store.all(), &self.selected_category) {
      Some(quote) => {
        let quote = quote.clone();
        ui::render_quote(&quote);
        self.session.save_last_quote(&quote)?;
      }
      None => {
        if self.store.is_empty() {
          ui::render_empty();
        } else {
          ui::render_no_match(&self.selected_category);
        }
      }
    }
    Ok(())
  }

  fn handle_tick(&mut self) {
    if self.ticks_until_sync == 0 {
      self.start_sync();
      self.ticks_until_sync = self.config.sync_interval_secs;
    } else {
      self.ticks_until_sync -= 1;
    }
  }

  /// Kick off a background snapshot fetch, unless one is in flight.
  fn start_sync(&mut self) {
    let Some(generation) = self.reconciler.begin_fetch() else {
      return;
    };

    let remote = self.remote.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      match remote.fetch_snapshot().await {
        Ok(quotes) => {
          let _ = tx.send(Event::Sync(SyncEvent::Snapshot { generation, quotes }));
        }
        Err(e) => {
          let _ = tx.send(Event::Sync(SyncEvent::Failed {
            generation,
            error: e.to_string(),
          }));
        }
      }
    });
  }

  pub fn handle_sync_event(&mut self, event: SyncEvent) -> Result<()> {
    match event {
      SyncEvent::Snapshot { generation, quotes } => {
        match self.reconciler.reconcile(generation, self.store.all(), quotes) {
          Some(SyncOutcome::InSync) => {
            debug!("Sync cycle {}: local and remote in sync", generation);
          }
          Some(SyncOutcome::Replaced(snapshot)) => {
            info!("Sync cycle {}: remote differed, server wins", generation);
            self.store.replace_all(snapshot);
            self.persist()?;
            ui::conflict_notice();
          }
          None => {} // Stale response, already superseded
        }
      }
      SyncEvent::Failed { generation, error } => {
        // Transient network trouble just skips the cycle.
        self.reconciler.fetch_failed(generation);
        warn!("Sync cycle {} failed: {}", generation, error);
      }
    }
    Ok(())
  }

  fn resolve_conflict(&mut self, resolution: Resolution) -> Result<()> {
    if !self.reconciler.pending_conflict() {
      ui::notice("No conflict is pending.");
      return Ok(());
    }

    match self.reconciler.resolve(resolution) {
      Some(snapshot) => {
        self.store.replace_all(snapshot);
        self.persist()?;
        ui::notice("Kept the server version.");
      }
      None => {
        // Keep local: persist whatever the store currently holds.
        self.persist()?;
        ui::notice("Kept the local version.");
      }
    }
    Ok(())
  }

  /// Mirror the store into the durable cache. Called after every mutation.
  fn persist(&self) -> Result<()> {
    self.durable.save_quotes(self.store.all())
  }

  // Accessors used by tests and the frontend
  pub fn quotes(&self) -> &[Quote] {
    self.store.all()
  }

  pub fn selected_category(&self) -> &str {
    &self.selected_category
  }

  pub fn pending_conflict(&self) -> bool {
    self.reconciler.pending_conflict()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::seed_quotes;

  fn test_app() -> App {
    let config = Config::default();
    let durable = QuoteCache::new(SqliteStorage::open_in_memory().unwrap());
    let session = QuoteCache::new(MemoryStorage::new());
    let remote = RemoteClient::new(&config).unwrap();
    App::with_parts(config, durable, session, remote).unwrap()
  }

  fn server_snapshot(titles: &[&str]) -> Vec<Quote> {
    titles.iter().map(|t| Quote::new(*t, "Server")).collect()
  }

  #[test]
  fn test_startup_restores_session_quote_without_a_fresh_pick() {
    let config = Config::default();
    let durable = QuoteCache::new(SqliteStorage::open_in_memory().unwrap());
    let session = QuoteCache::new(MemoryStorage::new());
    let restored = Quote::new("carried over", "Session");
    session.save_last_quote(&restored).unwrap();
    let remote = RemoteClient::new(&config).unwrap();
    let mut app = App::with_parts(config, durable, session, remote).unwrap();

    app.render_initial_view().unwrap();

    // The restored quote is not in the store; had a fresh pick run, the
    // session cache would now hold a seed quote instead.
    assert_eq!(app.session.load_last_quote().unwrap(), Some(restored));
  }

  #[test]
  fn test_startup_with_empty_session_picks_a_quote() {
    let mut app = test_app();
    assert!(app.session.load_last_quote().unwrap().is_none());

    app.render_initial_view().unwrap();
    let shown = app.session.load_last_quote().unwrap().unwrap();
    assert!(seed_quotes().contains(&shown));
  }

  #[test]
  fn test_starts_with_seed_quotes() {
    let app = test_app();
    assert_eq!(app.quotes(), seed_quotes());
    assert_eq!(app.selected_category(), ALL_CATEGORIES);
  }

  #[tokio::test]
  async fn test_add_mutates_and_persists() {
    let mut app = test_app();
    app
      .handle_command(ParsedCommand::Add {
        text: "fresh".to_string(),
        category: "Test".to_string(),
      })
      .unwrap();

    assert_eq!(app.quotes().len(), 4);
    // The durable mirror sees the mutation too.
    assert!(app.durable.load_quotes().unwrap().contains(&Quote::new("fresh", "Test")));
  }

  #[test]
  fn test_filter_persists_selected_category() {
    let mut app = test_app();
    app
      .handle_command(ParsedCommand::Filter {
        category: "Wisdom".to_string(),
      })
      .unwrap();

    assert_eq!(app.selected_category(), "Wisdom");
    assert_eq!(app.durable.load_selected_category().unwrap(), "Wisdom");
  }

  #[test]
  fn test_filter_with_no_matches_does_not_panic() {
    let mut app = test_app();
    app
      .handle_command(ParsedCommand::Filter {
        category: "Nonexistent".to_string(),
      })
      .unwrap();
    app.handle_command(ParsedCommand::Show).unwrap();
    assert_eq!(app.selected_category(), "Nonexistent");
  }

  #[test]
  fn test_matching_snapshot_flags_nothing() {
    let mut app = test_app();
    let local = app.quotes().to_vec();

    app
      .handle_sync_event(SyncEvent::Snapshot {
        generation: 1,
        quotes: local.clone(),
      })
      .unwrap();

    assert!(!app.pending_conflict());
    assert_eq!(app.quotes(), local);
  }

  #[test]
  fn test_differing_snapshot_applies_server_wins() {
    let mut app = test_app();
    let remote = server_snapshot(&["t1", "t2", "t3", "t4", "t5"]);

    app
      .handle_sync_event(SyncEvent::Snapshot {
        generation: 1,
        quotes: remote.clone(),
      })
      .unwrap();

    assert!(app.pending_conflict());
    assert_eq!(app.quotes(), remote);
    assert_eq!(app.durable.load_quotes().unwrap(), remote);
  }

  #[test]
  fn test_resolve_local_after_overwrite_is_lossy() {
    let mut app = test_app();
    let seeds = app.quotes().to_vec();
    let remote = server_snapshot(&["t1"]);

    app
      .handle_sync_event(SyncEvent::Snapshot {
        generation: 1,
        quotes: remote.clone(),
      })
      .unwrap();
    app.handle_command(ParsedCommand::Resolve(Resolution::KeepLocal)).unwrap();

    // The pre-overwrite seeds are gone; "keep local" keeps the current
    // store contents, which the server already replaced.
    assert!(!app.pending_conflict());
    assert_eq!(app.quotes(), remote);
    assert_ne!(app.quotes(), seeds);
  }

  #[test]
  fn test_resolve_remote_reapplies_snapshot() {
    let mut app = test_app();
    let remote = server_snapshot(&["t1", "t2"]);

    app
      .handle_sync_event(SyncEvent::Snapshot {
        generation: 1,
        quotes: remote.clone(),
      })
      .unwrap();
    app.handle_command(ParsedCommand::Resolve(Resolution::KeepRemote)).unwrap();

    assert!(!app.pending_conflict());
    assert_eq!(app.quotes(), remote);
  }

  #[test]
  fn test_resolve_without_conflict_is_a_noop() {
    let mut app = test_app();
    let before = app.quotes().to_vec();
    app.handle_command(ParsedCommand::Resolve(Resolution::KeepRemote)).unwrap();
    assert_eq!(app.quotes(), before);
  }

  #[tokio::test]
  async fn test_export_then_import_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotes.json");

    let mut app = test_app();
    let before = app.quotes().to_vec();

    app
      .handle_command(ParsedCommand::Export {
        path: Some(path.clone()),
      })
      .unwrap();
    app.handle_command(ParsedCommand::Import { path }).unwrap();

    // Import appends, it does not replace: the collection doubles.
    assert_eq!(app.quotes().len(), before.len() * 2);
    assert_eq!(&app.quotes()[..before.len()], before.as_slice());
    assert_eq!(&app.quotes()[before.len()..], before.as_slice());
  }

  #[test]
  fn test_import_missing_file_reports_without_mutation() {
    let mut app = test_app();
    let before = app.quotes().to_vec();
    app
      .handle_command(ParsedCommand::Import {
        path: PathBuf::from("/nonexistent/quotes.json"),
      })
      .unwrap();
    assert_eq!(app.quotes(), before);
  }

  #[test]
  fn test_sync_failure_releases_guard() {
    let mut app = test_app();
    let generation = app.reconciler.begin_fetch().unwrap();
    app
      .handle_sync_event(SyncEvent::Failed {
        generation,
        error: "connection refused".to_string(),
      })
      .unwrap();
    assert!(app.reconciler.begin_fetch().is_some());
  }
}
