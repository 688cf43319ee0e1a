//! Error types for `timbro-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::day::DayStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{date} is already marked as {status}")]
  DayLocked { date: NaiveDate, status: DayStatus },

  #[error("{date} is outside the submission window ({window_days} days back)")]
  OutsideSubmissionWindow { date: NaiveDate, window_days: u32 },

  #[error("invalid month: {year}-{month:02}")]
  InvalidMonth { year: i32, month: u32 },

  #[error("unknown activity category: {0:?}")]
  UnknownCategory(String),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error coming out of a [`TimesheetStore`](crate::store::TimesheetStore).
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
