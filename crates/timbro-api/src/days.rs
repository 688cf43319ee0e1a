//! Handlers for per-day endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees/{employee}/days/{date}` | Day with totals; empty if never stored |
//! | `POST` | `/employees/{employee}/days/{date}` | Body: [`DaySubmission`]; 409 if flagged, 422 outside window |
//! | `GET`  | `/employees/{employee}/history` | Every stored day, newest first |
//! | `PUT`  | `/admin/employees/{employee}/days/{date}/activities` | Body: activity list; replaces it |
//! | `PUT`  | `/admin/employees/{employee}/days/{date}/status` | Body: [`StatusUpdate`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use timbro_core::{
  activity::ActivityEntry,
  day::StatusUpdate,
  service::{DaySubmission, Timesheet},
  store::TimesheetStore,
  summary::DayRow,
};

use crate::error::ApiError;

type DayPath = Path<(String, NaiveDate)>;

/// `GET /employees/{employee}/days/{date}`
pub async fn get_one<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((employee, date)): DayPath,
) -> Result<Json<DayRow>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.day_view(&employee, date).await?))
}

/// `POST /employees/{employee}/days/{date}`
pub async fn submit<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((employee, date)): DayPath,
  Json(body): Json<DaySubmission>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TimesheetStore,
{
  let today = Local::now().date_naive();
  let record = timesheet.submit_day(&employee, date, body, today).await?;
  Ok((StatusCode::CREATED, Json(DayRow::new(date, &record))))
}

/// `GET /employees/{employee}/history`
pub async fn history<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path(employee): Path<String>,
) -> Result<Json<Vec<DayRow>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.history(&employee).await?))
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// `PUT /admin/employees/{employee}/days/{date}/activities`
pub async fn overwrite_activities<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((employee, date)): DayPath,
  Json(activities): Json<Vec<ActivityEntry>>,
) -> Result<Json<DayRow>, ApiError>
where
  S: TimesheetStore,
{
  let record = timesheet
    .overwrite_activities(&employee, date, activities)
    .await?;
  Ok(Json(DayRow::new(date, &record)))
}

/// `PUT /admin/employees/{employee}/days/{date}/status`
pub async fn set_status<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((employee, date)): DayPath,
  Json(update): Json<StatusUpdate>,
) -> Result<Json<DayRow>, ApiError>
where
  S: TimesheetStore,
{
  let record = timesheet.set_status(&employee, date, update).await?;
  Ok(Json(DayRow::new(date, &record)))
}
