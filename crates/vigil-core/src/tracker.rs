//! [`Tracker`] — the change-detection core.
//!
//! Orchestrates fetch → compare → persist → notify over the three injected
//! collaborators. Tracking ("enroll or refresh") and checking (periodic
//! change detection) are deliberately separate operations: `track` never
//! compares versions and never writes history.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  app::{AppSnapshot, TrackedApp, VersionChange},
  catalog::CatalogClient,
  notify::Notifier,
  store::VersionStore,
};

/// Monitors tracked apps and records version changes.
///
/// Collaborators are injected at construction; there is no ambient state.
pub struct Tracker<S, C, N> {
  store:    S,
  catalog:  C,
  notifier: N,
  stopping: AtomicBool,
}

impl<S, C, N> Tracker<S, C, N>
where
  S: VersionStore,
  C: CatalogClient,
  N: Notifier,
{
  pub fn new(store: S, catalog: C, notifier: N) -> Self {
    Self {
      store,
      catalog,
      notifier,
      stopping: AtomicBool::new(false),
    }
  }

  /// Ask an in-flight [`check_all`](Self::check_all) to stop after the
  /// identifier it is currently processing. No write is ever aborted
  /// mid-flight.
  pub fn request_stop(&self) {
    self.stopping.store(true, Ordering::Relaxed);
  }

  pub fn is_stopping(&self) -> bool {
    self.stopping.load(Ordering::Relaxed)
  }

  // ── Enrollment ────────────────────────────────────────────────────────────

  /// Start tracking a bundle identifier, or refresh it if already tracked.
  ///
  /// Catalog and store failures propagate; nothing partial is written. On
  /// first tracking `first_discovered` is set to now; afterwards the stored
  /// value is carried forward, discarding whatever the snapshot claims.
  pub async fn track(&self, bundle_id: &str) -> Result<TrackedApp> {
    let snapshot = self.catalog.lookup(bundle_id).await?;
    let existing = self
      .store
      .load_app(bundle_id)
      .await
      .map_err(Error::store)?;

    let now = Utc::now();
    let app = match existing {
      None => {
        tracing::info!(
          bundle_id = %snapshot.bundle_id,
          name      = %snapshot.name,
          version   = %snapshot.version,
          "now tracking"
        );
        snapshot.into_tracked(now, now)
      }
      Some(prev) => snapshot.into_tracked(prev.first_discovered, now),
    };

    self.store.save_app(app.clone()).await.map_err(Error::store)?;
    Ok(app)
  }

  // ── Periodic check ────────────────────────────────────────────────────────

  /// Check every tracked app for a version change and return the batch of
  /// changes detected in this run (possibly empty).
  ///
  /// Apps are checked strictly sequentially — a throttling courtesy to the
  /// catalog, not a locking requirement. A failing item is logged and
  /// skipped; it never aborts the rest of the batch. A non-empty batch is
  /// handed to the notifier, whose outcome is logged and otherwise ignored.
  pub async fn check_all(&self) -> Result<Vec<VersionChange>> {
    let apps = self.store.list_apps().await.map_err(Error::store)?;

    let mut changes = Vec::new();
    for app in &apps {
      if self.is_stopping() {
        tracing::info!("stop requested, ending check run early");
        break;
      }

      match self.check_one(app).await {
        Ok(Some(change)) => changes.push(change),
        Ok(None) => {}
        Err(e) => {
          tracing::warn!(bundle_id = %app.bundle_id, error = %e, "check failed, skipping");
        }
      }
    }

    if !changes.is_empty() {
      if let Err(e) = self.notifier.notify_batch(&changes).await {
        tracing::warn!(error = %e, "notification delivery failed");
      }
    }

    Ok(changes)
  }

  /// Check one app against the catalog.
  ///
  /// Exact string inequality is the only change test — a "downgrade" or a
  /// cosmetic re-tag counts. On no change the refreshed snapshot is still
  /// persisted (catalog metadata can move without a version bump) but no
  /// history entry is written.
  async fn check_one(&self, stored: &TrackedApp) -> Result<Option<VersionChange>> {
    let fresh: AppSnapshot = self.catalog.lookup(&stored.bundle_id).await?;
    let now = Utc::now();

    if fresh.version != stored.version {
      let change = VersionChange {
        bundle_id:     fresh.bundle_id.clone(),
        catalog_id:    fresh.catalog_id,
        name:          fresh.name.clone(),
        old_version:   stored.version.clone(),
        new_version:   fresh.version.clone(),
        detected_at:   now,
        release_notes: fresh.release_notes.clone(),
      };

      tracing::info!(
        bundle_id   = %change.bundle_id,
        old_version = %change.old_version,
        new_version = %change.new_version,
        "version change detected"
      );

      self
        .store
        .append_change(change.clone())
        .await
        .map_err(Error::store)?;
      self
        .store
        .save_app(fresh.into_tracked(stored.first_discovered, now))
        .await
        .map_err(Error::store)?;

      return Ok(Some(change));
    }

    // No version change: refresh the stored record (size, price, notes may
    // have moved) and touch last_checked.
    self
      .store
      .save_app(fresh.into_tracked(stored.first_discovered, now))
      .await
      .map_err(Error::store)?;

    Ok(None)
  }

  // ── Reads and removal ─────────────────────────────────────────────────────

  /// Stop tracking an app, deleting its current state and full history.
  /// Returns whether it was tracked.
  pub async fn remove(&self, bundle_id: &str) -> Result<bool> {
    self.store.remove_app(bundle_id).await.map_err(Error::store)
  }

  pub async fn tracked_apps(&self) -> Result<Vec<TrackedApp>> {
    self.store.list_apps().await.map_err(Error::store)
  }

  pub async fn tracked_app(&self, bundle_id: &str) -> Result<Option<TrackedApp>> {
    self.store.load_app(bundle_id).await.map_err(Error::store)
  }

  /// The full change history for one app, oldest first.
  pub async fn history(&self, bundle_id: &str) -> Result<Vec<VersionChange>> {
    self.store.list_changes(bundle_id).await.map_err(Error::store)
  }

  /// All changes detected after `cutoff`, across every tracked app.
  pub async fn changes_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<VersionChange>> {
    self.store.changes_since(cutoff).await.map_err(Error::store)
  }

  /// Search the catalog. Passthrough for the API and CLI surfaces.
  pub async fn search(
    &self,
    term: &str,
    limit: Option<u32>,
  ) -> Result<Vec<AppSnapshot>> {
    Ok(self.catalog.search(term, limit).await?)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
