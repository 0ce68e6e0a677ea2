//! vigil command-line interface and daemon binary.
//!
//! One-shot subcommands run a single operation against the local store and
//! exit. `vigil daemon` runs the periodic checker plus the HTTP API until
//! interrupted.

mod commands;
mod config;
mod daemon;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigil_catalog::ItunesClient;
use vigil_core::Tracker;
use vigil_notify::AppriseNotifier;
use vigil_store_sqlite::SqliteStore;

use self::config::Config;

#[derive(Parser)]
#[command(author, version, about = "Mac App Store version tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Start tracking an app by bundle identifier.
  Add {
    bundle_id: String,
  },
  /// Stop tracking an app and delete its history.
  Remove {
    bundle_id: String,
  },
  /// List all tracked apps.
  List,
  /// Show the version history of one app.
  History {
    bundle_id: String,
  },
  /// Show changes across all apps inside a time window.
  Recent {
    /// Window size, e.g. `24h`, `7d`, `90m`.
    #[arg(default_value = "24h")]
    window: humantime::Duration,
  },
  /// Check every tracked app for new versions right now.
  Check,
  /// Search the catalog by name.
  Search {
    term:  String,
    #[arg(short, long)]
    limit: Option<u32>,
  },
  /// Run the periodic checker and the HTTP API.
  Daemon,
}

/// Tracker over the production store, catalog, and notifier.
type AppTracker = Tracker<SqliteStore, ItunesClient, AppriseNotifier>;

async fn build_tracker(cfg: &Config) -> anyhow::Result<AppTracker> {
  let store = SqliteStore::open(&cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.db_path))?;
  let catalog = ItunesClient::new(&cfg.country)
    .context("failed to build catalog client")?;
  let notifier = AppriseNotifier::new(cfg.apprise_url.clone())
    .context("failed to build notifier")?;
  Ok(Tracker::new(store, catalog, notifier))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = Config::load(&cli.config)?;

  match cli.command {
    Command::Add { bundle_id } => {
      let tracker = build_tracker(&cfg).await?;
      commands::add(&tracker, &bundle_id).await
    }
    Command::Remove { bundle_id } => {
      let tracker = build_tracker(&cfg).await?;
      commands::remove(&tracker, &bundle_id).await
    }
    Command::List => {
      let tracker = build_tracker(&cfg).await?;
      commands::list(&tracker).await
    }
    Command::History { bundle_id } => {
      let tracker = build_tracker(&cfg).await?;
      commands::history(&tracker, &bundle_id).await
    }
    Command::Recent { window } => {
      let tracker = build_tracker(&cfg).await?;
      commands::recent(&tracker, window.into()).await
    }
    Command::Check => {
      let tracker = build_tracker(&cfg).await?;
      commands::check(&tracker).await
    }
    Command::Search { term, limit } => {
      let tracker = build_tracker(&cfg).await?;
      commands::search(&tracker, &term, limit).await
    }
    Command::Daemon => daemon::run(cfg).await,
  }
}
