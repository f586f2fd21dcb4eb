//! Client for the remote quote source.
//!
//! The remote is a stub data source: reads map its records into quotes
//! under a fixed "Server" category, and writes are best-effort telemetry
//! whose outcome never affects local state.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::store::Quote;

/// Category assigned to every quote mapped from the remote source.
pub const SERVER_CATEGORY: &str = "Server";

/// Maximum number of remote records taken per snapshot.
pub const SNAPSHOT_LIMIT: usize = 5;

/// A record as the remote endpoint returns it. Only the title is used;
/// other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RemoteRecord {
  pub title: String,
}

/// Remote API client wrapper
#[derive(Clone)]
pub struct RemoteClient {
  client: reqwest::Client,
  endpoint: Url,
}

impl RemoteClient {
  pub fn new(config: &Config) -> Result<Self> {
    let endpoint = Url::parse(&config.remote.url)
      .map_err(|e| eyre!("Invalid remote endpoint '{}': {}", config.remote.url, e))?;

    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, endpoint })
  }

  /// Fetch a snapshot of the remote quote collection.
  pub async fn fetch_snapshot(&self) -> Result<Vec<Quote>> {
    let response = self
      .client
      .get(self.endpoint.clone())
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch remote snapshot: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Remote snapshot request failed: {}", e))?;

    let records: Vec<RemoteRecord> = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse remote snapshot: {}", e))?;

    let quotes = map_records(records);
    debug!("Fetched remote snapshot of {} quotes", quotes.len());
    Ok(quotes)
  }

  /// Transmit a newly added quote to the remote endpoint. The response
  /// body is ignored; a non-success status is an error for the caller's
  /// failure handler to log.
  pub async fn push_quote(&self, quote: &Quote) -> Result<()> {
    self
      .client
      .post(self.endpoint.clone())
      .json(quote)
      .send()
      .await
      .map_err(|e| eyre!("Failed to push quote: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Quote push rejected: {}", e))?;

    Ok(())
  }

  /// Fire-and-forget push. Runs as a detached task with its own failure
  /// handler so the caller's control flow never depends on the outcome.
  pub fn spawn_push(&self, quote: Quote) {
    let client = self.clone();
    tokio::spawn(async move {
      if let Err(e) = client.push_quote(&quote).await {
        warn!("Best-effort quote push failed: {}", e);
      }
    });
  }
}

/// Map raw remote records into quotes: `title` becomes the text, the
/// category is fixed to "Server", and at most `SNAPSHOT_LIMIT` records
/// are taken.
pub fn map_records(records: Vec<RemoteRecord>) -> Vec<Quote> {
  records
    .into_iter()
    .take(SNAPSHOT_LIMIT)
    .map(|record| Quote::new(record.title, SERVER_CATEGORY))
    .collect()
}
