use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default remote endpoint: a stub quote source whose records carry a
/// `title` field.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default sync period, in seconds.
pub const DEFAULT_SYNC_INTERVAL: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub remote: RemoteConfig,
  /// Seconds between timer-driven sync cycles
  pub sync_interval_secs: u64,
  /// Override for the cache database location (mainly for side-by-side
  /// installations)
  pub cache_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
  pub url: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      remote: RemoteConfig::default(),
      sync_interval_secs: DEFAULT_SYNC_INTERVAL,
      cache_path: None,
    }
  }
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_ENDPOINT.to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./quotesync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/quotesync/config.yaml
  ///
  /// Unlike a config that carries credentials, nothing here is required,
  /// so a missing file yields the defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("quotesync.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("quotesync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
