//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. A timestamp that fails to
//! parse back is a corrupt record and surfaces as [`Error::DateParse`], never
//! as "absent".

use chrono::{DateTime, Utc};
use vigil_core::app::{TrackedApp, VersionChange};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `apps` row.
pub struct RawApp {
  pub bundle_id:        String,
  pub catalog_id:       i64,
  pub name:             String,
  pub version:          String,
  pub release_date:     String,
  pub release_notes:    String,
  pub developer:        String,
  pub min_os_version:   String,
  pub file_size_bytes:  i64,
  pub price:            f64,
  pub currency:         String,
  pub last_checked:     String,
  pub first_discovered: String,
}

impl RawApp {
  pub fn into_app(self) -> Result<TrackedApp> {
    Ok(TrackedApp {
      bundle_id:        self.bundle_id,
      catalog_id:       self.catalog_id,
      name:             self.name,
      version:          self.version,
      release_date:     decode_dt(&self.release_date)?,
      release_notes:    self.release_notes,
      developer:        self.developer,
      min_os_version:   self.min_os_version,
      file_size_bytes:  self.file_size_bytes,
      price:            self.price,
      currency:         self.currency,
      last_checked:     decode_dt(&self.last_checked)?,
      first_discovered: decode_dt(&self.first_discovered)?,
    })
  }
}

/// Raw values read directly from a `changes` row.
pub struct RawChange {
  pub bundle_id:     String,
  pub catalog_id:    i64,
  pub name:          String,
  pub old_version:   String,
  pub new_version:   String,
  pub detected_at:   String,
  pub release_notes: String,
}

impl RawChange {
  pub fn into_change(self) -> Result<VersionChange> {
    Ok(VersionChange {
      bundle_id:     self.bundle_id,
      catalog_id:    self.catalog_id,
      name:          self.name,
      old_version:   self.old_version,
      new_version:   self.new_version,
      detected_at:   decode_dt(&self.detected_at)?,
      release_notes: self.release_notes,
    })
  }
}
