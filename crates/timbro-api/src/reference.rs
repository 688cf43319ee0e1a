//! Handlers for reference data.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees` | Roster, names only |
//! | `GET`  | `/catalog/{category}` | `uffici`, `appartamenti`, `bnb`; `pst` is always empty |
//! | `GET`  | `/bnb` | BnB names for tickets |
//! | `GET`  | `/admin/reference` | Every `Data` document |
//! | `PUT`  | `/admin/reference/{doc_id}` | Body: the new payload |
//! | `GET`  | `/admin/apartments/{group}` | Apartment descriptions |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::Value;
use timbro_core::{
  reference::{ActivityCategory, Apartment, CatalogActivity, Employee, ReferenceDocument},
  service::Timesheet,
  store::TimesheetStore,
};

use crate::error::ApiError;

/// `GET /employees`
pub async fn employees<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.employees().await?))
}

/// `GET /catalog/{category}`
pub async fn catalog<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path(category): Path<String>,
) -> Result<Json<Vec<CatalogActivity>>, ApiError>
where
  S: TimesheetStore,
{
  let category: ActivityCategory = category.parse()?;
  Ok(Json(timesheet.catalog(category).await?))
}

/// `GET /bnb`
pub async fn bnb_names<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.bnb_names().await?))
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// `GET /admin/reference`
pub async fn list<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
) -> Result<Json<Vec<ReferenceDocument>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.reference_documents().await?))
}

/// `PUT /admin/reference/{doc_id}`
pub async fn update<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path(doc_id): Path<String>,
  Json(data): Json<Value>,
) -> Result<Json<ReferenceDocument>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.update_reference(&doc_id, data).await?))
}

/// `GET /admin/apartments/{group}`
pub async fn apartments<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path(group): Path<String>,
) -> Result<Json<Vec<Apartment>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.apartments(&group).await?))
}
