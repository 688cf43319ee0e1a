//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The day already carries a status flag.
  #[error("locked: {0}")]
  Locked(String),

  /// Well-formed but refused, e.g. a date outside the submission window.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<timbro_core::Error> for ApiError {
  fn from(err: timbro_core::Error) -> Self {
    use timbro_core::Error as Core;
    match err {
      Core::DayLocked { .. } => Self::Locked(err.to_string()),
      Core::OutsideSubmissionWindow { .. } => Self::Unprocessable(err.to_string()),
      Core::UnknownCategory(_) => Self::NotFound(err.to_string()),
      Core::InvalidMonth { .. } | Core::MissingField(_) => Self::BadRequest(err.to_string()),
      Core::Store(e) => Self::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Locked(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
