//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vigil_core::catalog::CatalogError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The upstream catalog failed — the client's request was fine.
  #[error("catalog error: {0}")]
  Catalog(CatalogError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<vigil_core::Error> for ApiError {
  fn from(err: vigil_core::Error) -> Self {
    match err {
      vigil_core::Error::Catalog(CatalogError::NotFound(id)) => {
        ApiError::NotFound(format!("app {id} not found in catalog"))
      }
      vigil_core::Error::Catalog(e) => ApiError::Catalog(e),
      vigil_core::Error::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Catalog(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
