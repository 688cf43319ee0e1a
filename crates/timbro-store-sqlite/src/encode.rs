//! Encoding and decoding helpers between domain types and the text stored in
//! SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`. Documents are compact JSON objects
//! using the product's field names.

use chrono::NaiveDate;
use serde_json::Value;
use timbro_core::{day::DayRecord, ticket::BnbTicket};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Day documents ───────────────────────────────────────────────────────────

/// The stored day document; carries its own date under `data`.
pub fn encode_day(date: NaiveDate, record: &DayRecord) -> Result<String> {
  let mut doc = serde_json::to_value(record)?;
  if let Value::Object(map) = &mut doc {
    map.insert("data".to_owned(), Value::String(encode_date(date)));
  }
  Ok(doc.to_string())
}

/// Sanitizes on the way in; unknown fields are ignored.
pub fn decode_day(s: &str) -> Result<DayRecord> { Ok(serde_json::from_str(s)?) }

// ─── Reference documents ─────────────────────────────────────────────────────

pub fn encode_document(doc_id: &str, body: &Value) -> Result<String> {
  if !body.is_object() {
    return Err(Error::NotAnObject(doc_id.to_owned()));
  }
  Ok(body.to_string())
}

pub fn decode_document(s: &str) -> Result<Value> { Ok(serde_json::from_str(s)?) }

// ─── Tickets ─────────────────────────────────────────────────────────────────

pub fn encode_ticket(ticket: &BnbTicket) -> Result<String> { Ok(serde_json::to_string(ticket)?) }

pub fn decode_ticket(s: &str) -> Result<BnbTicket> { Ok(serde_json::from_str(s)?) }
