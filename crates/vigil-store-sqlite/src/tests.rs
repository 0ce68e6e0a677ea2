//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use vigil_core::{
  app::{TrackedApp, VersionChange},
  store::VersionStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn app(bundle_id: &str, version: &str) -> TrackedApp {
  let now = Utc::now();
  TrackedApp {
    bundle_id:        bundle_id.to_owned(),
    catalog_id:       1_000,
    name:             format!("App {bundle_id}"),
    version:          version.to_owned(),
    release_date:     now,
    release_notes:    "initial release".to_owned(),
    developer:        "Example Corp".to_owned(),
    min_os_version:   "13.0".to_owned(),
    file_size_bytes:  4_096,
    price:            1.99,
    currency:         "USD".to_owned(),
    last_checked:     now,
    first_discovered: now,
  }
}

fn change(bundle_id: &str, old: &str, new: &str) -> VersionChange {
  VersionChange {
    bundle_id:     bundle_id.to_owned(),
    catalog_id:    1_000,
    name:          format!("App {bundle_id}"),
    old_version:   old.to_owned(),
    new_version:   new.to_owned(),
    detected_at:   Utc::now(),
    release_notes: format!("notes for {new}"),
  }
}

// ─── Current state ───────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_load_roundtrip() {
  let s = store().await;
  let a = app("com.example.a", "1.0");

  s.save_app(a.clone()).await.unwrap();
  let loaded = s.load_app("com.example.a").await.unwrap().unwrap();

  assert_eq!(loaded.bundle_id, a.bundle_id);
  assert_eq!(loaded.version, a.version);
  assert_eq!(loaded.price, a.price);
  assert_eq!(loaded.file_size_bytes, a.file_size_bytes);
  // RFC 3339 round-trips exactly.
  assert_eq!(loaded.first_discovered, a.first_discovered);
  assert_eq!(loaded.last_checked, a.last_checked);
}

#[tokio::test]
async fn load_missing_returns_none() {
  let s = store().await;
  assert!(s.load_app("com.example.ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn save_is_last_write_wins() {
  let s = store().await;
  s.save_app(app("com.example.a", "1.0")).await.unwrap();

  let mut updated = app("com.example.a", "2.0");
  updated.price = 0.0;
  s.save_app(updated).await.unwrap();

  // Still exactly one record.
  assert_eq!(s.list_apps().await.unwrap().len(), 1);
  let loaded = s.load_app("com.example.a").await.unwrap().unwrap();
  assert_eq!(loaded.version, "2.0");
  assert_eq!(loaded.price, 0.0);
}

#[tokio::test]
async fn list_apps_empty_store() {
  let s = store().await;
  assert!(s.list_apps().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_apps_returns_all() {
  let s = store().await;
  s.save_app(app("com.example.a", "1.0")).await.unwrap();
  s.save_app(app("com.example.b", "2.0")).await.unwrap();
  s.save_app(app("com.example.c", "3.0")).await.unwrap();

  let apps = s.list_apps().await.unwrap();
  assert_eq!(apps.len(), 3);
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn changes_for_unknown_app_are_empty() {
  let s = store().await;
  assert!(s.list_changes("com.example.ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn appended_changes_keep_insertion_order() {
  let s = store().await;
  s.append_change(change("com.example.a", "1.0", "1.1")).await.unwrap();
  s.append_change(change("com.example.a", "1.1", "1.2")).await.unwrap();
  s.append_change(change("com.example.a", "1.2", "1.3")).await.unwrap();

  let history = s.list_changes("com.example.a").await.unwrap();
  assert_eq!(history.len(), 3);
  assert_eq!(history[0].new_version, "1.1");
  assert_eq!(history[1].new_version, "1.2");
  assert_eq!(history[2].new_version, "1.3");
}

#[tokio::test]
async fn histories_are_keyed_per_app() {
  let s = store().await;
  s.append_change(change("com.example.a", "1.0", "1.1")).await.unwrap();
  s.append_change(change("com.example.b", "5.0", "5.1")).await.unwrap();

  let a = s.list_changes("com.example.a").await.unwrap();
  assert_eq!(a.len(), 1);
  assert_eq!(a[0].bundle_id, "com.example.a");
}

#[tokio::test]
async fn changes_since_filters_on_cutoff() {
  let s = store().await;

  let mut old = change("com.example.a", "1.0", "1.1");
  old.detected_at = Utc::now() - Duration::days(7);
  s.append_change(old).await.unwrap();
  s.append_change(change("com.example.a", "1.1", "1.2")).await.unwrap();
  s.append_change(change("com.example.b", "3.0", "3.1")).await.unwrap();

  let recent = s
    .changes_since(Utc::now() - Duration::hours(24))
    .await
    .unwrap();
  assert_eq!(recent.len(), 2);
  assert!(recent.iter().all(|c| c.new_version != "1.1"));
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_state_and_history_together() {
  let s = store().await;
  s.save_app(app("com.example.a", "1.1")).await.unwrap();
  s.append_change(change("com.example.a", "1.0", "1.1")).await.unwrap();
  s.save_app(app("com.example.b", "1.0")).await.unwrap();

  assert!(s.remove_app("com.example.a").await.unwrap());

  assert!(s.load_app("com.example.a").await.unwrap().is_none());
  assert!(s.list_changes("com.example.a").await.unwrap().is_empty());
  // The other app is untouched.
  assert!(s.load_app("com.example.b").await.unwrap().is_some());
}

#[tokio::test]
async fn remove_unknown_app_reports_false() {
  let s = store().await;
  assert!(!s.remove_app("com.example.ghost").await.unwrap());
}

// ─── Corruption ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_timestamp_is_an_error_not_absence() {
  let s = store().await;
  s.save_app(app("com.example.a", "1.0")).await.unwrap();

  // Clobber a stored timestamp behind the store's back.
  s.conn
    .call(|conn| {
      conn.execute(
        "UPDATE apps SET last_checked = 'not-a-date' WHERE bundle_id = 'com.example.a'",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.load_app("com.example.a").await.unwrap_err();
  assert!(matches!(err, crate::Error::DateParse(_)));
}
