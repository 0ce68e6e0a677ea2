//! Handler for `GET /search` — catalog text search, with each result
//! annotated with whether it is already tracked.

use std::{collections::HashSet, sync::Arc};

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use vigil_core::{
  Tracker,
  app::AppSnapshot,
  catalog::CatalogClient,
  notify::Notifier,
  store::VersionStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub term:  String,
  /// Zero or missing defaults to 10; the catalog caps results at 50.
  pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
  #[serde(flatten)]
  pub app:        AppSnapshot,
  pub is_tracked: bool,
}

/// `GET /search?term=...[&limit=...]`
pub async fn handler<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  if params.term.trim().is_empty() {
    return Err(ApiError::BadRequest("term is required".into()));
  }

  let snapshots = tracker.search(params.term.trim(), params.limit).await?;

  let tracked: HashSet<String> = tracker
    .tracked_apps()
    .await?
    .into_iter()
    .map(|app| app.bundle_id)
    .collect();

  let results = snapshots
    .into_iter()
    .map(|app| {
      let is_tracked = tracked.contains(&app.bundle_id);
      SearchResult { app, is_tracked }
    })
    .collect();

  Ok(Json(results))
}
