//! Handlers for BnB tickets.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tickets/{date}` | Every ticket filed that day |
//! | `PUT`  | `/tickets/{date}/{bnb}` | Body: [`BnbTicket`]; `dip1` required |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use timbro_core::{
  service::Timesheet,
  store::TimesheetStore,
  ticket::{BnbTicket, TicketView},
};

use crate::error::ApiError;

/// `GET /tickets/{date}`
pub async fn list<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<TicketView>>, ApiError>
where
  S: TimesheetStore,
{
  Ok(Json(timesheet.tickets(date).await?))
}

/// `PUT /tickets/{date}/{bnb}`
pub async fn save<S>(
  State(timesheet): State<Arc<Timesheet<S>>>,
  Path((date, bnb)): Path<(NaiveDate, String)>,
  Json(ticket): Json<BnbTicket>,
) -> Result<Json<TicketView>, ApiError>
where
  S: TimesheetStore,
{
  let view = timesheet.save_ticket(date, &bnb, ticket, Utc::now()).await?;
  Ok(Json(view))
}
