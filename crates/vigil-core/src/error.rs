//! Error types for `vigil-core`.

use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("catalog error: {0}")]
  Catalog(#[from] CatalogError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend-specific store error at the trait seam.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
