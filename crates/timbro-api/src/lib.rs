//! JSON REST API for Timbro.
//!
//! Exposes axum [`Router`]s backed by a [`Timesheet`] over any
//! [`TimesheetStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility; [`admin_router`] in particular must be mounted behind
//! whatever guards the back office.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", timbro_api::api_router(timesheet.clone()))
//! .nest("/api/admin", timbro_api::admin_router(timesheet).layer(auth))
//! ```

pub mod days;
pub mod error;
pub mod months;
pub mod reference;
pub mod tickets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use timbro_core::{service::Timesheet, store::TimesheetStore};

pub use error::ApiError;

/// Build the employee-facing router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(timesheet: Arc<Timesheet<S>>) -> Router<()>
where
  S: TimesheetStore + 'static,
{
  Router::new()
    // Reference data
    .route("/employees", get(reference::employees::<S>))
    .route("/catalog/{category}", get(reference::catalog::<S>))
    .route("/bnb", get(reference::bnb_names::<S>))
    // Days
    .route(
      "/employees/{employee}/days/{date}",
      get(days::get_one::<S>).post(days::submit::<S>),
    )
    .route("/employees/{employee}/history", get(days::history::<S>))
    // Reports
    .route(
      "/employees/{employee}/months/{year}/{month}",
      get(months::employee_month::<S>),
    )
    // Tickets
    .route("/tickets/{date}", get(tickets::list::<S>))
    .route("/tickets/{date}/{bnb}", put(tickets::save::<S>))
    .with_state(timesheet)
}

/// Build the back-office router. Paths are relative to its mount point,
/// conventionally `/admin`.
pub fn admin_router<S>(timesheet: Arc<Timesheet<S>>) -> Router<()>
where
  S: TimesheetStore + 'static,
{
  Router::new()
    .route("/months/{year}/{month}", get(months::all_employees::<S>))
    .route("/export/{year}/{month}", get(months::export::<S>))
    .route(
      "/employees/{employee}/days/{date}/activities",
      put(days::overwrite_activities::<S>),
    )
    .route(
      "/employees/{employee}/days/{date}/status",
      put(days::set_status::<S>),
    )
    .route("/reference", get(reference::list::<S>))
    .route("/reference/{doc_id}", put(reference::update::<S>))
    .route("/apartments/{group}", get(reference::apartments::<S>))
    .with_state(timesheet)
}
