//! [`SqliteStore`] — the SQLite implementation of [`VersionStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use vigil_core::{
  app::{TrackedApp, VersionChange},
  store::VersionStore,
};

use crate::{
  Error, Result,
  encode::{RawApp, RawChange, encode_dt},
  schema::SCHEMA,
};

const APP_COLUMNS: &str = "bundle_id, catalog_id, name, version, release_date, \
   release_notes, developer, min_os_version, file_size_bytes, price, \
   currency, last_checked, first_discovered";

const CHANGE_COLUMNS: &str = "bundle_id, catalog_id, name, old_version, \
   new_version, detected_at, release_notes";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A vigil version store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn app_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawApp> {
  Ok(RawApp {
    bundle_id:        row.get(0)?,
    catalog_id:       row.get(1)?,
    name:             row.get(2)?,
    version:          row.get(3)?,
    release_date:     row.get(4)?,
    release_notes:    row.get(5)?,
    developer:        row.get(6)?,
    min_os_version:   row.get(7)?,
    file_size_bytes:  row.get(8)?,
    price:            row.get(9)?,
    currency:         row.get(10)?,
    last_checked:     row.get(11)?,
    first_discovered: row.get(12)?,
  })
}

fn change_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawChange> {
  Ok(RawChange {
    bundle_id:     row.get(0)?,
    catalog_id:    row.get(1)?,
    name:          row.get(2)?,
    old_version:   row.get(3)?,
    new_version:   row.get(4)?,
    detected_at:   row.get(5)?,
    release_notes: row.get(6)?,
  })
}

// ─── VersionStore impl ───────────────────────────────────────────────────────

impl VersionStore for SqliteStore {
  type Error = Error;

  // ── Current state ─────────────────────────────────────────────────────────

  async fn save_app(&self, app: TrackedApp) -> Result<()> {
    let release_date_str     = encode_dt(app.release_date);
    let last_checked_str     = encode_dt(app.last_checked);
    let first_discovered_str = encode_dt(app.first_discovered);

    let sql = format!(
      "INSERT OR REPLACE INTO apps ({APP_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &sql,
          rusqlite::params![
            app.bundle_id,
            app.catalog_id,
            app.name,
            app.version,
            release_date_str,
            app.release_notes,
            app.developer,
            app.min_os_version,
            app.file_size_bytes,
            app.price,
            app.currency,
            last_checked_str,
            first_discovered_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_app(&self, bundle_id: &str) -> Result<Option<TrackedApp>> {
    let id = bundle_id.to_owned();

    let raw: Option<RawApp> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {APP_COLUMNS} FROM apps WHERE bundle_id = ?1"),
              rusqlite::params![id],
              app_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApp::into_app).transpose()
  }

  async fn list_apps(&self) -> Result<Vec<TrackedApp>> {
    let raws: Vec<RawApp> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {APP_COLUMNS} FROM apps"))?;
        let rows = stmt
          .query_map([], app_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApp::into_app).collect()
  }

  // ── History — append-only ─────────────────────────────────────────────────

  async fn append_change(&self, change: VersionChange) -> Result<()> {
    let detected_at_str = encode_dt(change.detected_at);

    let sql = format!(
      "INSERT INTO changes ({CHANGE_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &sql,
          rusqlite::params![
            change.bundle_id,
            change.catalog_id,
            change.name,
            change.old_version,
            change.new_version,
            detected_at_str,
            change.release_notes,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_changes(&self, bundle_id: &str) -> Result<Vec<VersionChange>> {
    let id = bundle_id.to_owned();

    let raws: Vec<RawChange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHANGE_COLUMNS} FROM changes
           WHERE bundle_id = ?1
           ORDER BY change_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], change_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChange::into_change).collect()
  }

  async fn changes_since(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<VersionChange>> {
    let cutoff_str = encode_dt(cutoff);

    let raws: Vec<RawChange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHANGE_COLUMNS} FROM changes
           WHERE detected_at > ?1
           ORDER BY change_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![cutoff_str], change_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChange::into_change).collect()
  }

  // ── Removal ───────────────────────────────────────────────────────────────

  async fn remove_app(&self, bundle_id: &str) -> Result<bool> {
    let id = bundle_id.to_owned();

    // Both deletes commit together; a concurrent reader sees either the app
    // with its full history or neither.
    let existed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM changes WHERE bundle_id = ?1", rusqlite::params![id])?;
        let n = tx.execute("DELETE FROM apps WHERE bundle_id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(existed)
  }
}
