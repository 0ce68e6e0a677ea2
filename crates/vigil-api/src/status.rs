//! Handler for `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::{
  Tracker, catalog::CatalogClient, notify::Notifier, store::VersionStore,
};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:       &'static str,
  pub version:      &'static str,
  pub tracked_apps: usize,
  pub timestamp:    DateTime<Utc>,
}

/// `GET /health` — a failing store surfaces as a 500 rather than a fake "ok".
pub async fn handler<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
) -> Result<Json<Health>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  let tracked_apps = tracker.tracked_apps().await?.len();

  Ok(Json(Health {
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
    tracked_apps,
    timestamp: Utc::now(),
  }))
}
