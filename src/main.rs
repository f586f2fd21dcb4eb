mod app;
mod cache;
mod commands;
mod config;
mod event;
mod remote;
mod select;
mod store;
mod sync;
mod transfer;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quotesync")]
#[command(about = "A quote collection manager that syncs against a remote quote source")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/quotesync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Remote endpoint URL to sync against
  #[arg(short, long)]
  endpoint: Option<String>,

  /// Seconds between sync cycles
  #[arg(short, long)]
  interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Keep the non-blocking writer alive for the program's lifetime.
  let _log_guard = init_logging();

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Apply command-line overrides
  if let Some(endpoint) = args.endpoint {
    config.remote.url = endpoint;
  }
  if let Some(interval) = args.interval {
    config.sync_interval_secs = interval;
  }

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}

/// Log to a file under the data directory so log lines don't interleave
/// with the console frontend. Falls back to stderr when the directory is
/// unavailable.
fn init_logging() -> Option<WorkerGuard> {
  let env_filter =
    || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quotesync=info"));

  let log_dir = dirs::data_dir().map(|d| d.join("quotesync"));
  let appender = log_dir.and_then(|dir| {
    std::fs::create_dir_all(&dir).ok()?;
    Some(tracing_appender::rolling::never(dir, "quotesync.log"))
  });

  match appender {
    Some(appender) => {
      let (writer, guard) = tracing_appender::non_blocking(appender);
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
      Some(guard)
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
      None
    }
  }
}
