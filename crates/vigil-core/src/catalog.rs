//! The `CatalogClient` trait — the remote catalog as the tracker sees it.
//!
//! Implemented by `vigil-catalog` against the iTunes API. The tracker only
//! relies on the contract here: `lookup` is idempotent and side-effect-free
//! on the remote system, and every call completes within a bounded timeout.

use std::future::Future;

use thiserror::Error;

use crate::app::AppSnapshot;

/// Errors a catalog fetch can produce.
///
/// `NotFound` and the rest split the taxonomy the tracker cares about: an
/// unknown identifier is a hard answer, everything else is transient or a
/// malformed payload.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("app not found in catalog: {0}")]
  NotFound(String),

  #[error("catalog returned status {0}")]
  Status(u16),

  #[error("catalog transport error: {0}")]
  Transport(String),

  #[error("failed to decode catalog response: {0}")]
  Decode(String),
}

/// Abstraction over the remote app catalog.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogClient: Send + Sync {
  /// Fetch the current metadata snapshot for one bundle identifier.
  fn lookup<'a>(
    &'a self,
    bundle_id: &'a str,
  ) -> impl Future<Output = Result<AppSnapshot, CatalogError>> + Send + 'a;

  /// Best-effort text search. A missing or zero `limit` defaults to 10;
  /// implementations cap the result count at 50 regardless of the request.
  fn search<'a>(
    &'a self,
    term: &'a str,
    limit: Option<u32>,
  ) -> impl Future<Output = Result<Vec<AppSnapshot>, CatalogError>> + Send + 'a;
}
