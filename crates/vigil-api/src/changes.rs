//! Handlers for the cross-app change feed and the on-demand check trigger.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use vigil_core::{
  Tracker,
  app::VersionChange,
  catalog::CatalogClient,
  notify::Notifier,
  store::VersionStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct RecentParams {
  /// RFC 3339 cutoff; defaults to 24 hours ago.
  pub since: Option<DateTime<Utc>>,
}

/// `GET /changes[?since=<rfc3339>]`
pub async fn recent<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<VersionChange>>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  let cutoff = params
    .since
    .unwrap_or_else(|| Utc::now() - Duration::hours(24));
  Ok(Json(tracker.changes_since(cutoff).await?))
}

/// `POST /check` — run a check over every tracked app right now and return
/// the batch of detected changes. An empty array is the normal no-news
/// outcome, not an error.
pub async fn check_now<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
) -> Result<Json<Vec<VersionChange>>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  Ok(Json(tracker.check_all().await?))
}
