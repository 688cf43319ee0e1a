//! The `TimesheetStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `timbro-store-sqlite`).
//! The [`Timesheet`](crate::service::Timesheet) service and the HTTP layer
//! depend on this abstraction, not on any concrete backend.
//!
//! Backends behave like a document store. Every write is a merge: top-level
//! fields of the written document replace the stored ones and any field the
//! writer does not know about survives.

use std::future::Future;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
  day::{DayRecord, EmployeeId},
  summary::MonthDays,
  ticket::BnbTicket,
};

/// Abstraction over a Timbro storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TimesheetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Day records ───────────────────────────────────────────────────────

  /// Load one day. `None` if nothing was ever stored for it.
  fn get_day(
    &self,
    employee: EmployeeId,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DayRecord>, Self::Error>> + Send + '_;

  /// Merge-write one day.
  fn put_day(
    &self,
    employee: EmployeeId,
    date: NaiveDate,
    record: DayRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every stored day of `employee` with `from <= date <= to`.
  fn days_between(
    &self,
    employee: EmployeeId,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<MonthDays, Self::Error>> + Send + '_;

  /// Every stored day of `employee`.
  fn all_days(
    &self,
    employee: EmployeeId,
  ) -> impl Future<Output = Result<MonthDays, Self::Error>> + Send + '_;

  // ── Reference documents ───────────────────────────────────────────────

  /// Raw body of a `Data` document.
  fn get_reference(
    &self,
    doc_id: String,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + '_;

  /// Every `Data` document as `(id, body)`, ordered by id.
  fn list_reference(
    &self,
  ) -> impl Future<Output = Result<Vec<(String, Value)>, Self::Error>> + Send + '_;

  /// Merge `body`, which must be a JSON object, into a `Data` document.
  fn put_reference(
    &self,
    doc_id: String,
    body: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── BnB tickets ───────────────────────────────────────────────────────

  /// Tickets filed for `date` as `(bnb_key, ticket)`, ordered by key.
  fn get_tickets(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<(String, BnbTicket)>, Self::Error>> + Send + '_;

  /// Store the ticket for `bnb_key` on `date`, replacing any earlier one
  /// for the same BnB.
  fn put_ticket(
    &self,
    date: NaiveDate,
    bnb_key: String,
    ticket: BnbTicket,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
