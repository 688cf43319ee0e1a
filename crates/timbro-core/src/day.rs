//! Day records: one employee, one calendar date.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{activity::ActivityEntry, minutes::total_effective_minutes};

// ─── Employee identifier ─────────────────────────────────────────────────────

/// Storage key for an employee: the display name with spaces replaced by `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
  pub fn from_name(name: &str) -> Self { Self(name.trim().replace(' ', "_")) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for EmployeeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// How a day is classified for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
  Sick,
  Vacation,
  Rest,
  /// No status flag and at least one activity.
  Worked,
  /// Nothing recorded.
  Empty,
}

impl DayStatus {
  /// `true` for the three flag-driven statuses.
  pub fn is_flagged(self) -> bool {
    matches!(self, Self::Sick | Self::Vacation | Self::Rest)
  }
}

impl fmt::Display for DayStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Sick => "sick",
      Self::Vacation => "vacation",
      Self::Rest => "rest",
      Self::Worked => "worked",
      Self::Empty => "empty",
    })
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The stored document for one employee and one date.
///
/// A missing document is equivalent to [`DayRecord::default`]. The status
/// flags are meant to be mutually exclusive; when several are set,
/// [`DayRecord::status`] resolves them as sick, then vacation, then rest.
/// A flagged day may still carry stale activities; they never count.
///
/// Deserialisation goes through [`RawDay`], so a damaged document still
/// yields a record instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDay")]
pub struct DayRecord {
  #[serde(rename = "attività")]
  pub activities: Vec<ActivityEntry>,
  #[serde(rename = "riposo")]
  pub rest_day:   bool,
  #[serde(rename = "ferie")]
  pub vacation:   bool,
  #[serde(rename = "malattia")]
  pub sick:       bool,
}

/// A day document exactly as it may appear in storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDay {
  #[serde(default, rename = "attività", alias = "activities")]
  pub attivita: Value,
  #[serde(default, alias = "restDay")]
  pub riposo:   Value,
  #[serde(default, alias = "vacation")]
  pub ferie:    Value,
  #[serde(default, alias = "sick")]
  pub malattia: Value,
}

impl From<RawDay> for DayRecord {
  fn from(raw: RawDay) -> Self {
    let activities = match &raw.attivita {
      Value::Array(items) => items
        .iter()
        .filter_map(|item| {
          if !item.is_object() {
            warn!(?item, "ignoring activity that is not an object");
            return None;
          }
          ActivityEntry::deserialize(item).ok()
        })
        .collect(),
      _ => Vec::new(),
    };
    Self {
      activities,
      rest_day: is_truthy(&raw.riposo),
      vacation: is_truthy(&raw.ferie),
      sick: is_truthy(&raw.malattia),
    }
  }
}

/// Flags written by older clients may be strings or numbers. Anything that
/// reads as "set" counts: `true`, non-zero numbers, non-empty strings and
/// containers.
fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

impl DayRecord {
  pub fn with_activities(activities: Vec<ActivityEntry>) -> Self {
    Self { activities, ..Self::default() }
  }

  pub fn sick() -> Self { Self { sick: true, ..Self::default() } }

  pub fn vacation() -> Self { Self { vacation: true, ..Self::default() } }

  pub fn rest() -> Self { Self { rest_day: true, ..Self::default() } }

  pub fn status(&self) -> DayStatus {
    if self.sick {
      DayStatus::Sick
    } else if self.vacation {
      DayStatus::Vacation
    } else if self.rest_day {
      DayStatus::Rest
    } else if !self.activities.is_empty() {
      DayStatus::Worked
    } else {
      DayStatus::Empty
    }
  }

  /// Raw effective minutes that count towards worked hours: zero for any
  /// flagged day.
  pub fn worked_minutes(&self) -> f64 {
    match self.status() {
      DayStatus::Worked => total_effective_minutes(&self.activities),
      _ => 0.0,
    }
  }

  pub fn apply_status(&mut self, update: &StatusUpdate) {
    if let Some(v) = update.rest_day {
      self.rest_day = v;
    }
    if let Some(v) = update.vacation {
      self.vacation = v;
    }
    if let Some(v) = update.sick {
      self.sick = v;
    }
  }
}

/// A partial change to the status flags. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
  #[serde(default, alias = "riposo")]
  pub rest_day: Option<bool>,
  #[serde(default, alias = "ferie")]
  pub vacation: Option<bool>,
  #[serde(default, alias = "malattia")]
  pub sick:     Option<bool>,
}
