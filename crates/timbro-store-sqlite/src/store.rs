//! [`SqliteStore`], the SQLite implementation of [`TimesheetStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::debug;

use timbro_core::{
  day::{DayRecord, EmployeeId},
  store::TimesheetStore,
  summary::MonthDays,
  ticket::BnbTicket,
};

use crate::{
  Error, Result,
  encode::{
    decode_date, decode_day, decode_document, decode_ticket, encode_date, encode_day,
    encode_document, encode_ticket,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Timbro store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Rows of `day_records` for one employee, optionally bounded by date.
  async fn select_days(
    &self,
    employee: EmployeeId,
    range: Option<(NaiveDate, NaiveDate)>,
  ) -> Result<MonthDays> {
    let employee_str = employee.as_str().to_owned();
    let (from_str, to_str) = match range {
      Some((from, to)) => (encode_date(from), encode_date(to)),
      None => ("0000-01-01".to_owned(), "9999-12-31".to_owned()),
    };

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date, document FROM day_records
           WHERE employee_id = ?1 AND date BETWEEN ?2 AND ?3
           ORDER BY date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![employee_str, from_str, to_str], |r| {
            Ok((r.get(0)?, r.get(1)?))
          })?
          .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .iter()
      .map(|(date, doc)| Ok((decode_date(date)?, decode_day(doc)?)))
      .collect()
  }
}

// ─── TimesheetStore impl ─────────────────────────────────────────────────────

impl TimesheetStore for SqliteStore {
  type Error = Error;

  // ── Day records ───────────────────────────────────────────────────────────

  async fn get_day(&self, employee: EmployeeId, date: NaiveDate) -> Result<Option<DayRecord>> {
    let employee_str = employee.as_str().to_owned();
    let date_str = encode_date(date);

    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT document FROM day_records WHERE employee_id = ?1 AND date = ?2",
              rusqlite::params![employee_str, date_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    doc.as_deref().map(decode_day).transpose()
  }

  async fn put_day(&self, employee: EmployeeId, date: NaiveDate, record: DayRecord) -> Result<()> {
    let employee_str = employee.as_str().to_owned();
    let date_str = encode_date(date);
    let doc = encode_day(date, &record)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO day_records (employee_id, date, document) VALUES (?1, ?2, ?3)
           ON CONFLICT (employee_id, date)
           DO UPDATE SET document = json_patch(document, excluded.document)",
          rusqlite::params![employee_str, date_str, doc],
        )?;
        Ok(())
      })
      .await?;

    debug!(%employee, %date, "day record written");
    Ok(())
  }

  async fn days_between(
    &self,
    employee: EmployeeId,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<MonthDays> {
    self.select_days(employee, Some((from, to))).await
  }

  async fn all_days(&self, employee: EmployeeId) -> Result<MonthDays> {
    self.select_days(employee, None).await
  }

  // ── Reference documents ───────────────────────────────────────────────────

  async fn get_reference(&self, doc_id: String) -> Result<Option<Value>> {
    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT document FROM reference_data WHERE doc_id = ?1",
              rusqlite::params![doc_id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    doc.as_deref().map(decode_document).transpose()
  }

  async fn list_reference(&self) -> Result<Vec<(String, Value)>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT doc_id, document FROM reference_data ORDER BY doc_id")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, doc)| Ok((id, decode_document(&doc)?)))
      .collect()
  }

  async fn put_reference(&self, doc_id: String, body: Value) -> Result<()> {
    let doc = encode_document(&doc_id, &body)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reference_data (doc_id, document) VALUES (?1, ?2)
           ON CONFLICT (doc_id)
           DO UPDATE SET document = json_patch(document, excluded.document)",
          rusqlite::params![doc_id, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── BnB tickets ───────────────────────────────────────────────────────────

  async fn get_tickets(&self, date: NaiveDate) -> Result<Vec<(String, BnbTicket)>> {
    let date_str = encode_date(date);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT bnb_key, document FROM tickets WHERE date = ?1 ORDER BY bnb_key")?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(key, doc)| Ok((key, decode_ticket(&doc)?)))
      .collect()
  }

  async fn put_ticket(&self, date: NaiveDate, bnb_key: String, ticket: BnbTicket) -> Result<()> {
    let date_str = encode_date(date);
    let doc = encode_ticket(&ticket)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tickets (date, bnb_key, document) VALUES (?1, ?2, ?3)
           ON CONFLICT (date, bnb_key) DO UPDATE SET document = excluded.document",
          rusqlite::params![date_str, bnb_key, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
