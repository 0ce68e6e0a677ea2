//! Handlers for `/apps` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/apps` | All tracked apps |
//! | `POST`   | `/apps` | Body: `{"bundle_id":"com.example.app"}` — 201 |
//! | `GET`    | `/apps/:bundle_id` | 404 if untracked |
//! | `DELETE` | `/apps/:bundle_id` | 204; 404 if untracked |
//! | `GET`    | `/apps/:bundle_id/changes` | Full history, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use vigil_core::{
  Tracker,
  app::{TrackedApp, VersionChange},
  catalog::CatalogClient,
  notify::Notifier,
  store::VersionStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /apps`
pub async fn list<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
) -> Result<Json<Vec<TrackedApp>>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  Ok(Json(tracker.tracked_apps().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TrackBody {
  pub bundle_id: String,
}

/// `POST /apps` — enroll (or refresh) a bundle identifier.
pub async fn create<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Json(body): Json<TrackBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  if body.bundle_id.trim().is_empty() {
    return Err(ApiError::BadRequest("bundle_id is required".into()));
  }

  let app = tracker.track(body.bundle_id.trim()).await?;
  Ok((StatusCode::CREATED, Json(app)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /apps/:bundle_id`
pub async fn get_one<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Path(bundle_id): Path<String>,
) -> Result<Json<TrackedApp>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  let app = tracker
    .tracked_app(&bundle_id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("app {bundle_id} is not tracked")))?;
  Ok(Json(app))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /apps/:bundle_id` — removes current state and history together.
pub async fn delete_one<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Path(bundle_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  if tracker.remove(&bundle_id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("app {bundle_id} is not tracked")))
  }
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /apps/:bundle_id/changes` — empty array for an unknown identifier.
pub async fn history<S, C, N>(
  State(tracker): State<Arc<Tracker<S, C, N>>>,
  Path(bundle_id): Path<String>,
) -> Result<Json<Vec<VersionChange>>, ApiError>
where
  S: VersionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient,
  N: Notifier,
{
  Ok(Json(tracker.history(&bundle_id).await?))
}
