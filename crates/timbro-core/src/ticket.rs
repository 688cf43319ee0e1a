//! BnB service tickets ("bigliettini"): what a crew did at one BnB on one
//! day, plus the linen it moved.
//!
//! Tickets for a date share one document, keyed by BnB name. Dots are not
//! allowed in document keys, so names are stored with `.` replaced by `_`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub fn bnb_key(name: &str) -> String { name.trim().replace('.', "_") }

/// Inverse of [`bnb_key`]. Names that contained `_` do not survive the
/// round trip.
pub fn bnb_name(key: &str) -> String { key.replace('_', ".") }

/// Per-item linen counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Linen {
  pub matrimoniale: u32,
  pub federa:       u32,
  pub viso:         u32,
  pub corpo:        u32,
  pub bidet:        u32,
  pub scendi_bagno: u32,
}

impl Linen {
  /// Linen changed by `checkouts` full check-out cleanings.
  pub fn for_checkouts(checkouts: u32) -> Self {
    Self {
      matrimoniale: 3 * checkouts,
      federa:       4 * checkouts,
      viso:         2 * checkouts,
      corpo:        2 * checkouts,
      bidet:        2 * checkouts,
      scendi_bagno: checkouts,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BnbTicket {
  /// Employee filing the ticket.
  pub dip1:             String,
  /// Optional second employee.
  pub dip2:             String,
  pub checkout:         u32,
  pub refresh:          u32,
  pub refresh_profondo: u32,
  pub area_comune:      u32,
  pub ciabattine:       u32,
  pub ore_extra:        u32,
  pub sporco:           Linen,
  pub pulito:           Linen,
  pub magazzino:        Linen,
  pub timestamp:        Option<DateTime<Utc>>,
}

impl BnbTicket {
  /// A ticket with dirty and clean linen pre-filled from `checkouts`.
  pub fn with_checkouts(dip1: impl Into<String>, checkouts: u32) -> Self {
    let linen = Linen::for_checkouts(checkouts);
    Self {
      dip1: dip1.into(),
      checkout: checkouts,
      sporco: linen,
      pulito: linen,
      ..Self::default()
    }
  }

  pub fn validate(&self, bnb: &str) -> Result<()> {
    if bnb.trim().is_empty() {
      return Err(Error::MissingField("bnb"));
    }
    if self.dip1.trim().is_empty() {
      return Err(Error::MissingField("dip1"));
    }
    Ok(())
  }
}

/// A stored ticket together with the BnB it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketView {
  pub bnb:    String,
  #[serde(flatten)]
  pub ticket: BnbTicket,
}
