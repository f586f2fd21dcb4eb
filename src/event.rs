use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::store::Quote;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// A line of user input
  Input(String),
  /// End of input (stdin closed)
  InputClosed,
  /// Periodic tick driving the sync schedule
  Tick,
  /// Result of a background sync fetch
  Sync(SyncEvent),
  /// Error from a background task
  Error(String),
}

/// Events produced by background sync fetches
#[derive(Debug)]
pub enum SyncEvent {
  /// A snapshot arrived for the tagged fetch generation
  Snapshot { generation: u64, quotes: Vec<Quote> },
  /// The tagged fetch failed; the cycle is skipped
  Failed { generation: u64, error: String },
}

/// Event handler that produces events from stdin lines and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn stdin line reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        match lines.next_line().await {
          Ok(Some(line)) => {
            if input_tx.send(Event::Input(line)).is_err() {
              break;
            }
          }
          Ok(None) => {
            let _ = input_tx.send(Event::InputClosed);
            break;
          }
          Err(e) => {
            let _ = input_tx.send(Event::Error(e.to_string()));
            break;
          }
        }
      }
    });

    // Spawn tick timer
    let tick_tx = tx.clone();
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(tick_rate);
      loop {
        interval.tick().await;
        if tick_tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks to report back with
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
