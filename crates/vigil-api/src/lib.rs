//! JSON REST API for vigil.
//!
//! Exposes an axum [`Router`] backed by any
//! [`Tracker`](vigil_core::Tracker). TLS, auth, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vigil_api::api_router(tracker.clone()))
//! ```

pub mod apps;
pub mod changes;
pub mod error;
pub mod search;
pub mod status;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use vigil_core::{
  Tracker, catalog::CatalogClient, notify::Notifier, store::VersionStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `tracker`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C, N>(tracker: Arc<Tracker<S, C, N>>) -> Router<()>
where
  S: VersionStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CatalogClient + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Tracked apps
    .route("/apps", get(apps::list::<S, C, N>).post(apps::create::<S, C, N>))
    .route(
      "/apps/{bundle_id}",
      get(apps::get_one::<S, C, N>).delete(apps::delete_one::<S, C, N>),
    )
    .route("/apps/{bundle_id}/changes", get(apps::history::<S, C, N>))
    // Change feed + on-demand check
    .route("/changes", get(changes::recent::<S, C, N>))
    .route("/check", post(changes::check_now::<S, C, N>))
    // Catalog search
    .route("/search", get(search::handler::<S, C, N>))
    // Liveness
    .route("/health", get(status::handler::<S, C, N>))
    .with_state(tracker)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::Utc;
  use tower::ServiceExt as _;
  use vigil_core::{
    app::{AppSnapshot, VersionChange},
    catalog::{CatalogClient, CatalogError},
    notify::{Notifier, NotifyError},
  };
  use vigil_store_sqlite::SqliteStore;

  use super::*;

  // ── Test doubles ────────────────────────────────────────────────────────

  /// Scripted catalog sharing its script with the test body through an Arc.
  #[derive(Clone, Default)]
  struct ScriptedCatalog {
    snapshots: Arc<Mutex<HashMap<String, AppSnapshot>>>,
  }

  impl ScriptedCatalog {
    fn set(&self, snapshot: AppSnapshot) {
      self
        .snapshots
        .lock()
        .unwrap()
        .insert(snapshot.bundle_id.clone(), snapshot);
    }
  }

  impl CatalogClient for ScriptedCatalog {
    async fn lookup(&self, bundle_id: &str) -> Result<AppSnapshot, CatalogError> {
      self
        .snapshots
        .lock()
        .unwrap()
        .get(bundle_id)
        .cloned()
        .ok_or_else(|| CatalogError::NotFound(bundle_id.to_owned()))
    }

    async fn search(
      &self,
      term: &str,
      _limit: Option<u32>,
    ) -> Result<Vec<AppSnapshot>, CatalogError> {
      Ok(
        self
          .snapshots
          .lock()
          .unwrap()
          .values()
          .filter(|s| s.name.to_lowercase().contains(&term.to_lowercase()))
          .cloned()
          .collect(),
      )
    }
  }

  struct NullNotifier;

  impl Notifier for NullNotifier {
    async fn notify_batch(&self, _changes: &[VersionChange]) -> Result<(), NotifyError> {
      Ok(())
    }
  }

  type TestTracker = Tracker<SqliteStore, ScriptedCatalog, NullNotifier>;

  async fn make_tracker() -> (Arc<TestTracker>, ScriptedCatalog) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let catalog = ScriptedCatalog::default();
    let tracker = Arc::new(Tracker::new(store, catalog.clone(), NullNotifier));
    (tracker, catalog)
  }

  fn snapshot(bundle_id: &str, name: &str, version: &str) -> AppSnapshot {
    AppSnapshot {
      bundle_id:       bundle_id.to_owned(),
      catalog_id:      7,
      name:            name.to_owned(),
      version:         version.to_owned(),
      release_date:    Utc::now(),
      release_notes:   "".to_owned(),
      developer:       "Example Corp".to_owned(),
      min_os_version:  "13.0".to_owned(),
      file_size_bytes: 1,
      price:           0.0,
      currency:        "USD".to_owned(),
    }
  }

  async fn send(
    tracker: Arc<TestTracker>,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> axum::response::Response {
    let builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    let req = match body {
      Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(tracker).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── /apps ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_empty_returns_empty_array() {
    let (tracker, _) = make_tracker().await;
    let resp = send(tracker, "GET", "/apps", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
  }

  #[tokio::test]
  async fn track_then_get_roundtrip() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha", "1.0"));

    let resp = send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["bundle_id"], "com.example.a");
    assert_eq!(created["version"], "1.0");

    let resp = send(tracker, "GET", "/apps/com.example.a", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = json_body(resp).await;
    assert_eq!(fetched["name"], "Alpha");
  }

  #[tokio::test]
  async fn track_unknown_bundle_returns_404() {
    let (tracker, _) = make_tracker().await;
    let resp = send(
      tracker,
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.ghost" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn track_empty_bundle_returns_400() {
    let (tracker, _) = make_tracker().await;
    let resp = send(
      tracker,
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "  " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn get_untracked_returns_404() {
    let (tracker, _) = make_tracker().await;
    let resp = send(tracker, "GET", "/apps/com.example.ghost", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_removes_app_and_history() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha", "1.0"));
    send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;

    let resp = send(tracker.clone(), "DELETE", "/apps/com.example.a", None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(tracker.clone(), "GET", "/apps/com.example.a", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deleting again reports not found.
    let resp = send(tracker, "DELETE", "/apps/com.example.a", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── /check and change feeds ─────────────────────────────────────────────

  #[tokio::test]
  async fn check_detects_and_reports_changes() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha", "1.0"));
    send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;

    catalog.set(snapshot("com.example.a", "Alpha", "1.1"));
    let resp = send(tracker.clone(), "POST", "/check", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let batch = json_body(resp).await;
    assert_eq!(batch.as_array().unwrap().len(), 1);
    assert_eq!(batch[0]["old_version"], "1.0");
    assert_eq!(batch[0]["new_version"], "1.1");

    // Per-app history and the cross-app feed both show it.
    let resp = send(tracker.clone(), "GET", "/apps/com.example.a/changes", None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);

    let resp = send(tracker, "GET", "/changes", None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn check_with_no_changes_returns_empty_batch() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha", "1.0"));
    send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;

    let resp = send(tracker, "POST", "/check", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
  }

  #[tokio::test]
  async fn history_of_unknown_app_is_empty_not_404() {
    let (tracker, _) = make_tracker().await;
    let resp = send(tracker, "GET", "/apps/com.example.ghost/changes", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
  }

  // ── /search ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_marks_tracked_results() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha Editor", "1.0"));
    catalog.set(snapshot("com.example.b", "Alpha Viewer", "2.0"));
    send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;

    let resp = send(tracker, "GET", "/search?term=alpha", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let results = json_body(resp).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);

    for result in results {
      let expected = result["bundle_id"] == "com.example.a";
      assert_eq!(result["is_tracked"], serde_json::json!(expected));
    }
  }

  #[tokio::test]
  async fn search_without_term_is_rejected() {
    let (tracker, _) = make_tracker().await;
    let resp = send(tracker, "GET", "/search?term=", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── /health ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_tracked_count() {
    let (tracker, catalog) = make_tracker().await;
    catalog.set(snapshot("com.example.a", "Alpha", "1.0"));
    send(
      tracker.clone(),
      "POST",
      "/apps",
      Some(serde_json::json!({ "bundle_id": "com.example.a" })),
    )
    .await;

    let resp = send(tracker, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let health = json_body(resp).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tracked_apps"], 1);
  }
}
