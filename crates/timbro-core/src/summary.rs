//! Monthly aggregation: month-level totals plus the per-day breakdown that
//! dashboards and exports render.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  activity::ActivityEntry,
  day::{DayRecord, DayStatus},
  minutes::{ClockTime, clock_time, decimal_hours_2, total_effective_minutes},
};

/// Days of one employee keyed by calendar date.
pub type MonthDays = BTreeMap<NaiveDate, DayRecord>;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Month-level totals for one employee. Derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
  /// Worked hours, rounded once to two places from the raw minute sum.
  pub decimal_hours: f64,
  pub sick_days:     u32,
  pub vacation_days: u32,
  pub rest_days:     u32,
}

/// Aggregate every supplied day. No filtering by month happens here.
///
/// Each day counts towards exactly one bucket, in the order sick, vacation,
/// rest, worked. Worked minutes are summed unrounded across the whole month
/// and converted to hours once at the end.
pub fn summarize_month<'a, I>(days: I) -> MonthSummary
where
  I: IntoIterator<Item = &'a DayRecord>,
{
  let mut summary = MonthSummary::default();
  let mut raw_minutes = 0.0;

  for day in days {
    match day.status() {
      DayStatus::Sick => summary.sick_days += 1,
      DayStatus::Vacation => summary.vacation_days += 1,
      DayStatus::Rest => summary.rest_days += 1,
      DayStatus::Worked => raw_minutes += total_effective_minutes(&day.activities),
      DayStatus::Empty => {}
    }
  }

  summary.decimal_hours = decimal_hours_2(raw_minutes);
  summary
}

// ─── Calendar helpers ────────────────────────────────────────────────────────

/// First and last day of `year`-`month`.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
  let invalid = || Error::InvalidMonth { year, month };
  let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
  let next = first.checked_add_months(chrono::Months::new(1)).ok_or_else(invalid)?;
  let last = next.checked_sub_days(Days::new(1)).ok_or_else(invalid)?;
  Ok((first, last))
}

// ─── Per-day rows ────────────────────────────────────────────────────────────

/// One activity line as shown in a day's detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLine {
  #[serde(flatten)]
  pub entry:             ActivityEntry,
  /// Rounded per row, for display only.
  pub effective_minutes: u64,
}

impl From<&ActivityEntry> for ActivityLine {
  fn from(entry: &ActivityEntry) -> Self {
    Self {
      entry:             entry.clone(),
      effective_minutes: entry.rounded_effective_minutes(),
    }
  }
}

/// One calendar day in a month table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
  pub date:       NaiveDate,
  pub status:     DayStatus,
  /// Decimal hours; `None` unless the day was worked.
  pub hours:      Option<f64>,
  pub clock:      Option<ClockTime>,
  /// The stored activities, also for flagged days.
  pub activities: Vec<ActivityLine>,
}

impl DayRow {
  pub fn new(date: NaiveDate, day: &DayRecord) -> Self {
    let status = day.status();
    let (hours, clock) = if status == DayStatus::Worked {
      let minutes = total_effective_minutes(&day.activities);
      (Some(decimal_hours_2(minutes)), Some(clock_time(minutes)))
    } else {
      (None, None)
    };
    Self {
      date,
      status,
      hours,
      clock,
      activities: day.activities.iter().map(ActivityLine::from).collect(),
    }
  }
}

/// Summary plus day-by-day rows for one employee and one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthReport {
  pub year:    i32,
  pub month:   u32,
  pub summary: MonthSummary,
  pub days:    Vec<DayRow>,
}

/// Build the report for `year`-`month` from `days`.
///
/// The summary covers every supplied day. Rows are produced for each
/// calendar day of the month, stopping after `through` when given; dates
/// without a record appear as [`DayStatus::Empty`].
pub fn build_month_report(
  year: i32,
  month: u32,
  days: &MonthDays,
  through: Option<NaiveDate>,
) -> Result<MonthReport> {
  let (first, last) = month_bounds(year, month)?;
  let last = through.map_or(last, |t| t.min(last));
  let empty = DayRecord::default();

  let rows = first
    .iter_days()
    .take_while(|d| *d <= last)
    .map(|date| DayRow::new(date, days.get(&date).unwrap_or(&empty)))
    .collect();

  Ok(MonthReport {
    year,
    month,
    summary: summarize_month(days.values()),
    days: rows,
  })
}
