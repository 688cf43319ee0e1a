//! Handlers for monthly reports and the export grid.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees/{employee}/months/{year}/{month}` | Optional `?through=YYYY-MM-DD` |
//! | `GET`  | `/admin/months/{year}/{month}` | Every rostered employee |
//! | `GET`  | `/admin/export/{year}/{month}` | Workbook grid |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use timbro_core::{
  export::MonthlyWorkbook,
  service::{EmployeeMonth, Timesheet},
  store::TimesheetStore,
  summary::MonthReport,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  /// Last day shown in the per-day table. The summary still covers the
  /// whole month.
  pub through: Option<NaiveDate>,
}

/// `GET /employees/{employee}/months/{year}/{month}[?through=<date>]`
pub async fn employee_month<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((employee, year, month)): Path<(String, i32, u32)>,
  Query(params): Query<ReportParams>,
) -> Result<Json<MonthReport>, ApiError>
where
  S: TimesheetStore,
{
  let report = timesheet
    .month_report(&employee, year, month, params.through)
    .await?;
  Ok(Json(report))
}

/// `GET /admin/months/{year}/{month}[?through=<date>]`
pub async fn all_employees<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((year, month)): Path<(i32, u32)>,
  Query(params): Query<ReportParams>,
) -> Result<Json<Vec<EmployeeMonth>>, ApiError>
where
  S: TimesheetStore,
{
  let reports = timesheet
    .all_employees_month(year, month, params.through)
    .await?;
  Ok(Json(reports))
}

/// `GET /admin/export/{year}/{month}`
pub async fn export<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlyWorkbook>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.workbook(year, month).await?))
}
