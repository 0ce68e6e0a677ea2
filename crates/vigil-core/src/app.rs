//! App records — the persisted current state and its change history.
//!
//! A [`TrackedApp`] is the single current-state record for one bundle
//! identifier. [`VersionChange`] entries form the app's append-only history:
//! they are written exactly when a check observes a differing version string
//! and are never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted current-state record for one tracked app.
///
/// `version` is opaque — it is compared only for inequality, never ordered.
/// `first_discovered` is set once, on first tracking, and carried forward on
/// every subsequent write; `last_checked` advances on every fetch, whether or
/// not the version moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedApp {
  pub bundle_id:        String,
  /// Numeric id the catalog assigns alongside the bundle identifier.
  pub catalog_id:       i64,
  pub name:             String,
  pub version:          String,
  pub release_date:     DateTime<Utc>,
  pub release_notes:    String,
  pub developer:        String,
  pub min_os_version:   String,
  pub file_size_bytes:  i64,
  pub price:            f64,
  pub currency:         String,
  pub last_checked:     DateTime<Utc>,
  pub first_discovered: DateTime<Utc>,
}

/// A point-in-time fetch result from the catalog, not yet merged with stored
/// state. Carries everything a [`TrackedApp`] does except the two tracker-
/// owned timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
  pub bundle_id:       String,
  pub catalog_id:      i64,
  pub name:            String,
  pub version:         String,
  pub release_date:    DateTime<Utc>,
  pub release_notes:   String,
  pub developer:       String,
  pub min_os_version:  String,
  pub file_size_bytes: i64,
  pub price:           f64,
  pub currency:        String,
}

impl AppSnapshot {
  /// Merge this snapshot into a full record. The caller supplies both
  /// timestamps — the snapshot never self-reports them.
  pub fn into_tracked(
    self,
    first_discovered: DateTime<Utc>,
    last_checked: DateTime<Utc>,
  ) -> TrackedApp {
    TrackedApp {
      bundle_id: self.bundle_id,
      catalog_id: self.catalog_id,
      name: self.name,
      version: self.version,
      release_date: self.release_date,
      release_notes: self.release_notes,
      developer: self.developer,
      min_os_version: self.min_os_version,
      file_size_bytes: self.file_size_bytes,
      price: self.price,
      currency: self.currency,
      last_checked,
      first_discovered,
    }
  }
}

/// One entry in an app's append-only version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionChange {
  pub bundle_id:     String,
  pub catalog_id:    i64,
  pub name:          String,
  pub old_version:   String,
  pub new_version:   String,
  pub detected_at:   DateTime<Utc>,
  /// Release notes as they read at detection time.
  pub release_notes: String,
}
