//! The monthly export grid: one block per employee, one column per day.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  day::{DayRecord, DayStatus},
  minutes::{decimal_hours_2, total_effective_minutes},
  summary::{MonthDays, month_bounds},
};

/// One day column of an employee block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCell {
  pub day:      u32,
  pub vacation: bool,
  pub sick:     bool,
  /// Decimal hours for a worked day.
  pub hours:    Option<f64>,
}

impl SheetCell {
  fn new(date: NaiveDate, record: &DayRecord) -> (Self, f64) {
    let raw = record.worked_minutes();
    let cell = Self {
      day:      date.day(),
      vacation: record.vacation,
      sick:     record.sick,
      hours:    (record.status() == DayStatus::Worked).then(|| decimal_hours_2(raw)),
    };
    (cell, raw)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSheet {
  pub employee:    String,
  pub days:        Vec<SheetCell>,
  /// Rounded once from the summed raw minutes of the month.
  pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyWorkbook {
  pub year:          i32,
  pub month:         u32,
  pub days_in_month: u32,
  pub sheets:        Vec<EmployeeSheet>,
}

/// Build the export grid for `year`-`month`.
///
/// Only dates inside the month are read from each employee's days; sheets
/// keep the order of `employees`.
pub fn build_workbook<'a, I>(year: i32, month: u32, employees: I) -> Result<MonthlyWorkbook>
where
  I: IntoIterator<Item = (&'a str, &'a MonthDays)>,
{
  let (first, last) = month_bounds(year, month)?;
  let empty = DayRecord::default();

  let sheets = employees
    .into_iter()
    .map(|(employee, days)| {
      let mut raw_total = 0.0;
      let cells = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| {
          let (cell, raw) = SheetCell::new(date, days.get(&date).unwrap_or(&empty));
          raw_total += raw;
          cell
        })
        .collect();
      EmployeeSheet {
        employee:    employee.to_owned(),
        days:        cells,
        total_hours: decimal_hours_2(raw_total),
      }
    })
    .collect();

  Ok(MonthlyWorkbook {
    year,
    month,
    days_in_month: last.day(),
    sheets,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::activity::ActivityEntry;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn grid_marks_status_and_hours() {
    let mut days = MonthDays::new();
    days.insert(
      date("2025-04-01"),
      DayRecord::with_activities(vec![ActivityEntry::new("uffici", "A", 50).with_people(3)]),
    );
    days.insert(date("2025-04-02"), DayRecord::vacation());
    let mut sick = DayRecord::with_activities(vec![ActivityEntry::new("uffici", "A", 600)]);
    sick.sick = true;
    days.insert(date("2025-04-03"), sick);
    days.insert(
      date("2025-04-04"),
      DayRecord::with_activities(vec![ActivityEntry::new("uffici", "A", 100).with_people(3)]),
    );
    // Outside the month, ignored.
    days.insert(
      date("2025-05-01"),
      DayRecord::with_activities(vec![ActivityEntry::new("uffici", "A", 600)]),
    );

    let book = build_workbook(2025, 4, [("Maria", &days)]).unwrap();
    assert_eq!(book.days_in_month, 30);
    let sheet = &book.sheets[0];
    assert_eq!(sheet.days.len(), 30);
    assert_eq!(sheet.days[0].hours, Some(0.28));
    assert!(sheet.days[1].vacation);
    assert_eq!(sheet.days[1].hours, None);
    assert!(sheet.days[2].sick);
    assert_eq!(sheet.days[2].hours, None);
    // 50/3 + 100/3 = 50 min exactly.
    assert_eq!(sheet.total_hours, 0.83);
  }

  #[test]
  fn employees_without_days_get_an_empty_block() {
    let none = MonthDays::new();
    let book = build_workbook(2024, 2, [("A", &none), ("B", &none)]).unwrap();
    assert_eq!(book.sheets.len(), 2);
    assert_eq!(book.sheets[1].employee, "B");
    assert_eq!(book.sheets[0].days.len(), 29);
    assert_eq!(book.sheets[0].total_hours, 0.0);
  }
}
