//! Daemon configuration.
//!
//! Loaded from a TOML file (default `config.toml`, override with `--config`)
//! layered with `VIGIL_`-prefixed environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Floor for the check interval. Checking more often than this hammers the
/// catalog for no benefit.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default = "default_db_path")]
  pub db_path:             PathBuf,
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_check_interval")]
  pub check_interval_secs: u64,
  #[serde(default = "default_country")]
  pub country:             String,
  #[serde(default)]
  pub apprise_url:         Option<String>,
  /// Bundle identifiers to enroll at daemon startup.
  #[serde(default)]
  pub apps:                Vec<String>,
}

fn default_db_path() -> PathBuf { PathBuf::from("vigil.db") }
fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_check_interval() -> u64 { 3600 }
fn default_country() -> String { "us".to_owned() }

impl Config {
  /// Load configuration from `path` (missing file is fine, defaults apply)
  /// overlaid with `VIGIL_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("VIGIL"))
      .build()
      .context("failed to read config file")?;

    let cfg: Config = settings
      .try_deserialize()
      .context("failed to deserialise configuration")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.check_interval_secs < MIN_CHECK_INTERVAL_SECS {
      anyhow::bail!(
        "check_interval_secs must be at least {MIN_CHECK_INTERVAL_SECS} \
         (got {})",
        self.check_interval_secs
      );
    }
    if self.country.is_empty() {
      anyhow::bail!("country must not be empty");
    }
    Ok(())
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      db_path:             default_db_path(),
      host:                default_host(),
      port:                default_port(),
      check_interval_secs: default_check_interval(),
      country:             default_country(),
      apprise_url:         None,
      apps:                Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_config_is_valid() {
    assert!(Config::default().validate().is_ok());
  }

  #[test]
  fn sub_minute_interval_is_rejected() {
    let cfg = Config { check_interval_secs: 30, ..Config::default() };
    assert!(cfg.validate().is_err());
  }

  #[test]
  fn minimum_interval_is_accepted() {
    let cfg = Config {
      check_interval_secs: MIN_CHECK_INTERVAL_SECS,
      ..Config::default()
    };
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn empty_country_is_rejected() {
    let cfg = Config { country: String::new(), ..Config::default() };
    assert!(cfg.validate().is_err());
  }
}
