//! iTunes catalog client — the reqwest implementation of
//! [`CatalogClient`](vigil_core::catalog::CatalogClient).
//!
//! The iTunes search API is tolerant but quirky: `fileSizeBytes` arrives as a
//! string, most metadata fields may be missing entirely, and release dates
//! are RFC 3339. All of that is absorbed here so the rest of the system only
//! ever sees a clean [`AppSnapshot`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vigil_core::{
  app::AppSnapshot,
  catalog::{CatalogClient, CatalogError},
};

const LOOKUP_URL: &str = "https://itunes.apple.com/lookup";
const SEARCH_URL: &str = "https://itunes.apple.com/search";

/// Default result count when the caller gives no (or a zero) limit.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Hard cap on search results, regardless of the requested limit.
pub const MAX_SEARCH_LIMIT: u32 = 50;

// ─── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for the iTunes lookup/search API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. Every
/// request carries a 30-second timeout so one unreachable endpoint cannot
/// stall a whole check run.
#[derive(Clone)]
pub struct ItunesClient {
  http:       reqwest::Client,
  lookup_url: String,
  search_url: String,
  country:    String,
}

impl ItunesClient {
  pub fn new(country: impl Into<String>) -> Result<Self, CatalogError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| CatalogError::Transport(e.to_string()))?;

    Ok(Self {
      http,
      lookup_url: LOOKUP_URL.to_owned(),
      search_url: SEARCH_URL.to_owned(),
      country: country.into(),
    })
  }

  async fn fetch(
    &self,
    url: &str,
    params: &[(&str, &str)],
  ) -> Result<CatalogResponse, CatalogError> {
    let resp = self
      .http
      .get(url)
      .query(params)
      .send()
      .await
      .map_err(|e| CatalogError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(CatalogError::Status(status.as_u16()));
    }

    resp
      .json::<CatalogResponse>()
      .await
      .map_err(|e| CatalogError::Decode(e.to_string()))
  }
}

impl CatalogClient for ItunesClient {
  async fn lookup(&self, bundle_id: &str) -> Result<AppSnapshot, CatalogError> {
    let body = self
      .fetch(
        &self.lookup_url,
        &[
          ("bundleId", bundle_id),
          ("entity", "software"),
          ("country", &self.country),
        ],
      )
      .await?;

    body
      .results
      .into_iter()
      .next()
      .map(CatalogEntry::into_snapshot)
      .ok_or_else(|| CatalogError::NotFound(bundle_id.to_owned()))
  }

  async fn search(
    &self,
    term: &str,
    limit: Option<u32>,
  ) -> Result<Vec<AppSnapshot>, CatalogError> {
    let limit = clamp_limit(limit).to_string();
    let body = self
      .fetch(
        &self.search_url,
        &[
          ("term", term),
          ("entity", "software"),
          ("country", &self.country),
          ("limit", &limit),
        ],
      )
      .await?;

    Ok(
      body
        .results
        .into_iter()
        .map(CatalogEntry::into_snapshot)
        .collect(),
    )
  }
}

/// Resolve a caller-requested search limit: missing or zero falls back to
/// [`DEFAULT_SEARCH_LIMIT`], anything above [`MAX_SEARCH_LIMIT`] is capped.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
  match limit {
    None | Some(0) => DEFAULT_SEARCH_LIMIT,
    Some(n) => n.min(MAX_SEARCH_LIMIT),
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogResponse {
  #[serde(default)]
  results: Vec<CatalogEntry>,
}

/// One result object as the iTunes API serialises it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
  track_id:  i64,
  bundle_id: String,
  track_name: String,
  version:   String,
  #[serde(default)]
  current_version_release_date: String,
  #[serde(default)]
  release_notes: String,
  #[serde(default)]
  artist_name: String,
  #[serde(default)]
  minimum_os_version: String,
  /// A string on the wire, despite the name.
  #[serde(default)]
  file_size_bytes: String,
  #[serde(default)]
  price: f64,
  #[serde(default)]
  currency: String,
}

impl CatalogEntry {
  fn into_snapshot(self) -> AppSnapshot {
    let release_date = DateTime::parse_from_rfc3339(&self.current_version_release_date)
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or_else(|_| Utc::now());

    let file_size_bytes = self.file_size_bytes.parse::<i64>().unwrap_or_else(|_| {
      if !self.file_size_bytes.is_empty() {
        tracing::debug!(
          bundle_id = %self.bundle_id,
          raw       = %self.file_size_bytes,
          "unparseable fileSizeBytes, defaulting to 0"
        );
      }
      0
    });

    AppSnapshot {
      bundle_id: self.bundle_id,
      catalog_id: self.track_id,
      name: self.track_name,
      version: self.version,
      release_date,
      release_notes: self.release_notes,
      developer: self.artist_name,
      min_os_version: self.minimum_os_version,
      file_size_bytes,
      price: self.price,
      currency: self.currency,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
