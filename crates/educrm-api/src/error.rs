//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use educrm_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map any classified store or domain error onto its HTTP category.
  pub fn store<E>(e: E) -> Self
  where
    E: Classify + std::error::Error + Send + Sync + 'static,
  {
    match e.kind() {
      ErrorKind::InvalidArgument => Self::BadRequest(e.to_string()),
      ErrorKind::NotFound => Self::NotFound(e.to_string()),
      ErrorKind::PreconditionFailed => Self::PreconditionFailed(e.to_string()),
      ErrorKind::StoreUnavailable | ErrorKind::DivisionByZero => {
        Self::Store(Box::new(e))
      }
    }
  }
}

impl From<educrm_core::Error> for ApiError {
  fn from(e: educrm_core::Error) -> Self { Self::store(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::PreconditionFailed(m) => (StatusCode::PRECONDITION_FAILED, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
