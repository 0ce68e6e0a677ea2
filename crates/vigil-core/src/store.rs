//! The `VersionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `vigil-store-sqlite`).
//! Higher layers (`vigil-api`, `vigil-cli`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Backends must make each operation atomic per bundle identifier: a
//! concurrent reader never observes a half-written record, or a current-state
//! record whose history has already been deleted out from under it.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::app::{TrackedApp, VersionChange};

/// Abstraction over a vigil storage backend.
///
/// Current-state records are upserted last-write-wins; change history is
/// append-only and deleted only as a whole, together with its app record.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait VersionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Current state ─────────────────────────────────────────────────────

  /// Upsert the current-state record for `app.bundle_id`.
  fn save_app(
    &self,
    app: TrackedApp,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Load the current-state record. `None` means "not yet tracked" — a
  /// normal outcome, distinct from an I/O or decode failure.
  fn load_app<'a>(
    &'a self,
    bundle_id: &'a str,
  ) -> impl Future<Output = Result<Option<TrackedApp>, Self::Error>> + Send + 'a;

  /// All tracked apps, in no particular order. An empty store yields an
  /// empty vec.
  fn list_apps(
    &self,
  ) -> impl Future<Output = Result<Vec<TrackedApp>, Self::Error>> + Send + '_;

  // ── History — append-only ─────────────────────────────────────────────

  /// Append one change to its app's history.
  fn append_change(
    &self,
    change: VersionChange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The full history for one app, in insertion order. Empty (not an error)
  /// for unknown identifiers.
  fn list_changes<'a>(
    &'a self,
    bundle_id: &'a str,
  ) -> impl Future<Output = Result<Vec<VersionChange>, Self::Error>> + Send + 'a;

  /// All changes across all apps with `detected_at` after `cutoff`, in
  /// insertion order.
  fn changes_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<VersionChange>, Self::Error>> + Send + '_;

  // ── Removal ───────────────────────────────────────────────────────────

  /// Delete the current-state record and the full history together, as one
  /// atomic operation. Returns whether the app existed.
  fn remove_app<'a>(
    &'a self,
    bundle_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
