//! Error type for `timbro-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// Documents are JSON objects; anything else cannot be merged.
  #[error("document {0} is not a JSON object")]
  NotAnObject(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
