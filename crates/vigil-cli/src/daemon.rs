//! Long-running daemon: periodic version checks plus the HTTP API.

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{Config, build_tracker};

pub async fn run(cfg: Config) -> anyhow::Result<()> {
  let tracker = Arc::new(build_tracker(&cfg).await?);

  // Enroll configured apps. Individual failures are logged, not fatal,
  // so one bad identifier cannot keep the daemon down.
  for bundle_id in &cfg.apps {
    match tracker.track(bundle_id).await {
      Ok(app) => {
        tracing::info!(%bundle_id, version = %app.version, "tracking app");
      }
      Err(error) => {
        tracing::warn!(%bundle_id, %error, "failed to enroll configured app");
      }
    }
  }

  // Ctrl-C flips the tracker's stop flag (the in-flight check finishes its
  // current app) and signals both loops below to wind down.
  let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
  {
    let tracker = tracker.clone();
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
        tracker.request_stop();
        let _ = shutdown_tx.send(true);
      }
    });
  }

  // HTTP API.
  let app = vigil_api::api_router(tracker.clone())
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("listening on http://{address}");

  let mut server_rx = shutdown_rx.clone();
  let server = tokio::spawn(async move {
    axum::serve(listener, app)
      .with_graceful_shutdown(async move {
        let _ = server_rx.changed().await;
      })
      .await
  });

  // Check loop. The first tick fires immediately, so startup always runs a
  // full check before settling into the interval.
  let mut interval =
    tokio::time::interval(Duration::from_secs(cfg.check_interval_secs));
  loop {
    tokio::select! {
      _ = interval.tick() => {
        match tracker.check_all().await {
          Ok(changes) if changes.is_empty() => {
            tracing::info!("check complete, no updates");
          }
          Ok(changes) => {
            tracing::info!(count = changes.len(), "check complete, updates detected");
          }
          Err(error) => {
            tracing::error!(%error, "periodic check failed");
          }
        }
      }
      _ = shutdown_rx.changed() => break,
    }
  }

  server.await.context("server task panicked")??;
  tracing::info!("daemon stopped");
  Ok(())
}
