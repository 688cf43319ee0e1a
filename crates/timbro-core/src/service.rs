//! The `Timesheet` service: the engine wired to a [`TimesheetStore`].
//!
//! Everything that needs both stored state and a rule lives here: the
//! submission guards, admin corrections, report assembly and the cached
//! reference data. The engine functions it calls stay pure.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::{
  Error, Result,
  activity::ActivityEntry,
  day::{DayRecord, EmployeeId, StatusUpdate},
  export::{MonthlyWorkbook, build_workbook},
  merge::{MergePolicy, merge_daily_activities},
  reference::{
    APARTMENT_GROUPS, ActivityCategory, Apartment, BNB_NAMES_DOC, CatalogActivity, EMPLOYEES_DOC,
    Employee, ReferenceCache, ReferenceDocument, parse_apartments, parse_catalog, parse_employees,
    parse_names,
  },
  store::TimesheetStore,
  summary::{DayRow, MonthDays, MonthReport, build_month_report, month_bounds},
  ticket::{BnbTicket, TicketView, bnb_key, bnb_name},
};

// ─── Rules ───────────────────────────────────────────────────────────────────

/// How employee submissions are merged and which dates they may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRules {
  pub policy:      MergePolicy,
  /// Submissions are accepted for `[today - n, today]`. `None` accepts any
  /// date.
  pub window_days: Option<u32>,
}

impl Default for SubmissionRules {
  fn default() -> Self {
    Self {
      policy:      MergePolicy::Replace,
      window_days: Some(1),
    }
  }
}

impl SubmissionRules {
  pub fn check_window(&self, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let Some(window_days) = self.window_days else {
      return Ok(());
    };
    let earliest = today
      .checked_sub_days(Days::new(u64::from(window_days)))
      .unwrap_or(NaiveDate::MIN);
    if date < earliest || date > today {
      return Err(Error::OutsideSubmissionWindow { date, window_days });
    }
    Ok(())
  }
}

// ─── Inputs and views ────────────────────────────────────────────────────────

/// What an employee sends for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySubmission {
  #[serde(default, alias = "attività")]
  pub activities: Vec<ActivityEntry>,
  #[serde(flatten)]
  pub status:     StatusUpdate,
}

/// One employee's report inside the all-employees view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeMonth {
  pub employee: String,
  pub report:   MonthReport,
}

// ─── Day locks ───────────────────────────────────────────────────────────────

/// One async mutex per `(employee, date)`. A day is read, changed and written
/// back while its guard is held, so concurrent writes to the same day queue
/// up instead of overwriting each other.
#[derive(Default)]
struct DayLocks {
  locks: Mutex<HashMap<(EmployeeId, NaiveDate), Arc<AsyncMutex<()>>>>,
}

impl DayLocks {
  async fn acquire(&self, id: &EmployeeId, date: NaiveDate) -> OwnedMutexGuard<()> {
    let lock = {
      let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
      // Entries nobody holds or waits on.
      locks.retain(|_, lock| Arc::strong_count(lock) > 1);
      locks.entry((id.clone(), date)).or_default().clone()
    };
    lock.lock_owned().await
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Timesheet<S> {
  store:     S,
  rules:     SubmissionRules,
  reference: ReferenceCache,
  day_locks: DayLocks,
}

impl<S: TimesheetStore> Timesheet<S> {
  pub fn new(store: S, rules: SubmissionRules) -> Self {
    Self {
      store,
      rules,
      reference: ReferenceCache::new(),
      day_locks: DayLocks::default(),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn rules(&self) -> SubmissionRules { self.rules }

  // ── Days ──────────────────────────────────────────────────────────────

  /// The stored day, or an empty one.
  pub async fn day(&self, employee: &str, date: NaiveDate) -> Result<DayRecord> {
    let id = employee_id(employee)?;
    debug!(%id, %date, "loading day");
    let day = self.store.get_day(id, date).await.map_err(Error::store)?;
    Ok(day.unwrap_or_default())
  }

  /// The day with its computed totals.
  pub async fn day_view(&self, employee: &str, date: NaiveDate) -> Result<DayRow> {
    let day = self.day(employee, date).await?;
    Ok(DayRow::new(date, &day))
  }

  /// Record an employee's submission for `date`.
  ///
  /// Refused when the stored day already carries a status flag, or when
  /// `date` falls outside the submission window ending at `today`.
  /// Concurrent submissions for the same day are applied one after the
  /// other.
  pub async fn submit_day(
    &self,
    employee: &str,
    date: NaiveDate,
    submission: DaySubmission,
    today: NaiveDate,
  ) -> Result<DayRecord> {
    let id = employee_id(employee)?;
    let _guard = self.day_locks.acquire(&id, date).await;
    let stored = self.day(employee, date).await?;

    let status = stored.status();
    if status.is_flagged() {
      return Err(Error::DayLocked { date, status });
    }
    self.rules.check_window(date, today)?;

    let activities =
      merge_daily_activities(&stored.activities, &submission.activities, self.rules.policy);
    let mut record = DayRecord { activities, ..stored };
    record.apply_status(&submission.status);

    self
      .store
      .put_day(id.clone(), date, record.clone())
      .await
      .map_err(Error::store)?;
    info!(
      %id,
      %date,
      activities = record.activities.len(),
      status = %record.status(),
      "day submitted"
    );
    Ok(record)
  }

  /// Replace the whole activity list of a day. Entries without a name are
  /// dropped; the status flags are left alone.
  pub async fn overwrite_activities(
    &self,
    employee: &str,
    date: NaiveDate,
    activities: Vec<ActivityEntry>,
  ) -> Result<DayRecord> {
    let id = employee_id(employee)?;
    let _guard = self.day_locks.acquire(&id, date).await;
    let mut record = self.day(employee, date).await?;
    record.activities = activities
      .into_iter()
      .filter(|a| !a.name.trim().is_empty())
      .collect();

    self
      .store
      .put_day(id.clone(), date, record.clone())
      .await
      .map_err(Error::store)?;
    info!(%id, %date, activities = record.activities.len(), "activities overwritten");
    Ok(record)
  }

  pub async fn set_status(
    &self,
    employee: &str,
    date: NaiveDate,
    update: StatusUpdate,
  ) -> Result<DayRecord> {
    let id = employee_id(employee)?;
    let _guard = self.day_locks.acquire(&id, date).await;
    let mut record = self.day(employee, date).await?;
    record.apply_status(&update);

    self
      .store
      .put_day(id.clone(), date, record.clone())
      .await
      .map_err(Error::store)?;
    info!(%id, %date, status = %record.status(), "status set");
    Ok(record)
  }

  // ── Reports ───────────────────────────────────────────────────────────

  pub async fn month_days(&self, employee: &str, year: i32, month: u32) -> Result<MonthDays> {
    let id = employee_id(employee)?;
    let (first, last) = month_bounds(year, month)?;
    debug!(%id, year, month, "loading month");
    self
      .store
      .days_between(id, first, last)
      .await
      .map_err(Error::store)
  }

  pub async fn month_report(
    &self,
    employee: &str,
    year: i32,
    month: u32,
    through: Option<NaiveDate>,
  ) -> Result<MonthReport> {
    let days = self.month_days(employee, year, month).await?;
    build_month_report(year, month, &days, through)
  }

  /// Reports for every rostered employee, including those with nothing
  /// recorded, ordered by name.
  pub async fn all_employees_month(
    &self,
    year: i32,
    month: u32,
    through: Option<NaiveDate>,
  ) -> Result<Vec<EmployeeMonth>> {
    let mut out = Vec::new();
    for employee in self.employees().await? {
      let report = self.month_report(&employee.name, year, month, through).await?;
      out.push(EmployeeMonth {
        employee: employee.name,
        report,
      });
    }
    Ok(out)
  }

  /// All stored days of an employee, newest first.
  pub async fn history(&self, employee: &str) -> Result<Vec<DayRow>> {
    let id = employee_id(employee)?;
    let days = self.store.all_days(id).await.map_err(Error::store)?;
    Ok(
      days
        .iter()
        .rev()
        .map(|(date, day)| DayRow::new(*date, day))
        .collect(),
    )
  }

  pub async fn workbook(&self, year: i32, month: u32) -> Result<MonthlyWorkbook> {
    let mut sheets = Vec::new();
    for employee in self.employees().await? {
      let days = self.month_days(&employee.name, year, month).await?;
      sheets.push((employee.name, days));
    }
    build_workbook(
      year,
      month,
      sheets.iter().map(|(name, days)| (name.as_str(), days)),
    )
  }

  // ── Reference data ────────────────────────────────────────────────────

  pub async fn reference_document(&self, doc_id: &str) -> Result<ReferenceDocument> {
    if let Some(doc) = self.reference.get(doc_id) {
      return Ok(doc);
    }
    debug!(doc_id, "loading reference document");
    let generation = self.reference.generation();
    let body = self
      .store
      .get_reference(doc_id.to_owned())
      .await
      .map_err(Error::store)?
      .unwrap_or(Value::Null);
    let doc = ReferenceDocument::from_body(doc_id, &body);
    self.reference.insert(doc.clone(), generation);
    Ok(doc)
  }

  pub async fn reference_documents(&self) -> Result<Vec<ReferenceDocument>> {
    let generation = self.reference.generation();
    let docs = self.store.list_reference().await.map_err(Error::store)?;
    Ok(
      docs
        .into_iter()
        .map(|(id, body)| {
          let doc = ReferenceDocument::from_body(id, &body);
          self.reference.insert(doc.clone(), generation);
          doc
        })
        .collect(),
    )
  }

  /// Replace the payload of a reference document.
  pub async fn update_reference(&self, doc_id: &str, data: Value) -> Result<ReferenceDocument> {
    if doc_id.trim().is_empty() {
      return Err(Error::MissingField("doc_id"));
    }
    let doc = ReferenceDocument {
      id: doc_id.to_owned(),
      data,
    };
    self
      .store
      .put_reference(doc.id.clone(), doc.to_body())
      .await
      .map_err(Error::store)?;
    self.reference.invalidate(doc_id);
    info!(doc_id, "reference document updated");
    Ok(doc)
  }

  /// The roster, sorted by name.
  pub async fn employees(&self) -> Result<Vec<Employee>> {
    let doc = self.reference_document(EMPLOYEES_DOC).await?;
    let mut employees = parse_employees(&doc);
    employees.sort_by_cached_key(|e| e.name.to_lowercase());
    Ok(employees)
  }

  /// Predefined activities for `category`; empty for free-text categories.
  pub async fn catalog(&self, category: ActivityCategory) -> Result<Vec<CatalogActivity>> {
    let Some(doc_id) = category.catalog_doc() else {
      return Ok(Vec::new());
    };
    let doc = self.reference_document(doc_id).await?;
    Ok(parse_catalog(&doc))
  }

  pub async fn bnb_names(&self) -> Result<Vec<String>> {
    let doc = self.reference_document(BNB_NAMES_DOC).await?;
    Ok(parse_names(&doc))
  }

  pub async fn apartments(&self, group: &str) -> Result<Vec<Apartment>> {
    if !APARTMENT_GROUPS.contains(&group) {
      return Err(Error::UnknownCategory(group.to_owned()));
    }
    let doc = self.reference_document(group).await?;
    Ok(parse_apartments(&doc))
  }

  // ── BnB tickets ───────────────────────────────────────────────────────

  pub async fn tickets(&self, date: NaiveDate) -> Result<Vec<TicketView>> {
    let tickets = self.store.get_tickets(date).await.map_err(Error::store)?;
    Ok(
      tickets
        .into_iter()
        .map(|(key, ticket)| TicketView {
          bnb: bnb_name(&key),
          ticket,
        })
        .collect(),
    )
  }

  /// File the ticket for `bnb` on `date`, stamped with `now`.
  pub async fn save_ticket(
    &self,
    date: NaiveDate,
    bnb: &str,
    mut ticket: BnbTicket,
    now: DateTime<Utc>,
  ) -> Result<TicketView> {
    ticket.validate(bnb)?;
    ticket.timestamp = Some(now);
    let key = bnb_key(bnb);
    self
      .store
      .put_ticket(date, key.clone(), ticket.clone())
      .await
      .map_err(Error::store)?;
    info!(%date, bnb = %key, dip1 = %ticket.dip1, "ticket saved");
    Ok(TicketView {
      bnb: bnb.trim().to_owned(),
      ticket,
    })
  }
}

fn employee_id(name: &str) -> Result<EmployeeId> {
  let id = EmployeeId::from_name(name);
  if id.is_empty() {
    return Err(Error::MissingField("employee"));
  }
  Ok(id)
}

#[cfg(test)]
mod tests {
  use std::{
    collections::{BTreeMap, HashMap},
    convert::Infallible,
    future::Future,
    sync::Mutex,
  };

  use serde_json::json;

  use super::*;
  use crate::day::DayStatus;

  // ─── In-memory store ─────────────────────────────────────────────────────

  #[derive(Default)]
  struct MemoryStore {
    days:        Mutex<BTreeMap<(EmployeeId, NaiveDate), DayRecord>>,
    reference:   Mutex<BTreeMap<String, Value>>,
    tickets:     Mutex<HashMap<NaiveDate, BTreeMap<String, BnbTicket>>>,
    /// Yield to the runtime before every write, like a real backend would.
    slow_writes: bool,
  }

  impl MemoryStore {
    async fn pause(&self) {
      if self.slow_writes {
        tokio::task::yield_now().await;
      }
    }
  }

  impl TimesheetStore for MemoryStore {
    type Error = Infallible;

    fn get_day(
      &self,
      employee: EmployeeId,
      date: NaiveDate,
    ) -> impl Future<Output = Result<Option<DayRecord>, Infallible>> + Send + '_ {
      async move { Ok(self.days.lock().unwrap().get(&(employee, date)).cloned()) }
    }

    fn put_day(
      &self,
      employee: EmployeeId,
      date: NaiveDate,
      record: DayRecord,
    ) -> impl Future<Output = Result<(), Infallible>> + Send + '_ {
      async move {
        self.pause().await;
        self.days.lock().unwrap().insert((employee, date), record);
        Ok(())
      }
    }

    fn days_between(
      &self,
      employee: EmployeeId,
      from: NaiveDate,
      to: NaiveDate,
    ) -> impl Future<Output = Result<MonthDays, Infallible>> + Send + '_ {
      async move {
        Ok(
          self
            .days
            .lock()
            .unwrap()
            .iter()
            .filter(|((e, d), _)| *e == employee && *d >= from && *d <= to)
            .map(|((_, d), r)| (*d, r.clone()))
            .collect(),
        )
      }
    }

    fn all_days(
      &self,
      employee: EmployeeId,
    ) -> impl Future<Output = Result<MonthDays, Infallible>> + Send + '_ {
      self.days_between(employee, NaiveDate::MIN, NaiveDate::MAX)
    }

    fn get_reference(
      &self,
      doc_id: String,
    ) -> impl Future<Output = Result<Option<Value>, Infallible>> + Send + '_ {
      async move { Ok(self.reference.lock().unwrap().get(&doc_id).cloned()) }
    }

    fn list_reference(
      &self,
    ) -> impl Future<Output = Result<Vec<(String, Value)>, Infallible>> + Send + '_ {
      async move {
        Ok(
          self
            .reference
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        )
      }
    }

    fn put_reference(
      &self,
      doc_id: String,
      body: Value,
    ) -> impl Future<Output = Result<(), Infallible>> + Send + '_ {
      async move {
        self.pause().await;
        self.reference.lock().unwrap().insert(doc_id, body);
        Ok(())
      }
    }

    fn get_tickets(
      &self,
      date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<(String, BnbTicket)>, Infallible>> + Send + '_ {
      async move {
        Ok(
          self
            .tickets
            .lock()
            .unwrap()
            .get(&date)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
        )
      }
    }

    fn put_ticket(
      &self,
      date: NaiveDate,
      bnb_key: String,
      ticket: BnbTicket,
    ) -> impl Future<Output = Result<(), Infallible>> + Send + '_ {
      async move {
        self
          .tickets
          .lock()
          .unwrap()
          .entry(date)
          .or_default()
          .insert(bnb_key, ticket);
        Ok(())
      }
    }
  }

  // ─── Helpers ─────────────────────────────────────────────────────────────

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn sheet(rules: SubmissionRules) -> Timesheet<MemoryStore> {
    Timesheet::new(MemoryStore::default(), rules)
  }

  fn slow_sheet(rules: SubmissionRules) -> Timesheet<MemoryStore> {
    let store = MemoryStore {
      slow_writes: true,
      ..Default::default()
    };
    Timesheet::new(store, rules)
  }

  fn submission(entries: Vec<ActivityEntry>) -> DaySubmission {
    DaySubmission {
      activities: entries,
      ..Default::default()
    }
  }

  fn office(name: &str, minutes: u32) -> ActivityEntry {
    ActivityEntry::new("uffici", name, minutes)
  }

  // ─── Submissions ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_then_read_back() {
    let ts = sheet(SubmissionRules::default());
    let today = date("2025-01-02");
    ts.submit_day("Maria Rossi", today, submission(vec![office("A", 480)]), today)
      .await
      .unwrap();

    let view = ts.day_view("Maria Rossi", today).await.unwrap();
    assert_eq!(view.status, DayStatus::Worked);
    assert_eq!(view.hours, Some(8.0));
    assert_eq!(view.clock.unwrap().to_string(), "8:00");

    // Stored under the underscored id.
    let stored = ts
      .store()
      .days
      .lock()
      .unwrap()
      .contains_key(&(EmployeeId::from_name("Maria Rossi"), today));
    assert!(stored);
  }

  #[tokio::test]
  async fn resubmission_follows_the_policy() {
    let today = date("2025-01-02");

    let replace = sheet(SubmissionRules::default());
    replace.submit_day("A", today, submission(vec![office("X", 30)]), today).await.unwrap();
    let day = replace
      .submit_day("A", today, submission(vec![office("X", 20)]), today)
      .await
      .unwrap();
    assert_eq!(day.activities[0].minutes, 20);

    let accumulate = sheet(SubmissionRules {
      policy: MergePolicy::Accumulate,
      ..Default::default()
    });
    accumulate.submit_day("A", today, submission(vec![office("X", 30)]), today).await.unwrap();
    let day = accumulate
      .submit_day("A", today, submission(vec![office("X", 20)]), today)
      .await
      .unwrap();
    assert_eq!(day.activities[0].minutes, 50);
  }

  #[tokio::test]
  async fn concurrent_submissions_for_one_day_both_land() {
    let ts = slow_sheet(SubmissionRules::default());
    let today = date("2025-01-02");

    let (a, b) = tokio::join!(
      ts.submit_day("Maria", today, submission(vec![office("A", 30)]), today),
      ts.submit_day("Maria", today, submission(vec![office("B", 45)]), today),
    );
    a.unwrap();
    b.unwrap();

    let day = ts.day("Maria", today).await.unwrap();
    let names: Vec<_> = day.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
  }

  #[tokio::test]
  async fn status_change_racing_a_submission_is_kept() {
    let ts = slow_sheet(SubmissionRules::default());
    let today = date("2025-01-02");

    let (submitted, flagged) = tokio::join!(
      ts.submit_day("Maria", today, submission(vec![office("A", 30)]), today),
      ts.set_status("Maria", today, StatusUpdate { vacation: Some(true), ..Default::default() }),
    );
    submitted.unwrap();
    flagged.unwrap();

    let day = ts.day("Maria", today).await.unwrap();
    assert_eq!(day.activities.len(), 1);
    assert!(day.vacation);
  }

  #[tokio::test]
  async fn flagged_days_are_locked() {
    let ts = sheet(SubmissionRules::default());
    let today = date("2025-01-02");
    ts.set_status("A", today, StatusUpdate { vacation: Some(true), ..Default::default() })
      .await
      .unwrap();

    let err = ts
      .submit_day("A", today, submission(vec![office("X", 30)]), today)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::DayLocked { status: DayStatus::Vacation, .. }));
  }

  #[tokio::test]
  async fn submission_window() {
    let ts = sheet(SubmissionRules::default());
    let today = date("2025-03-01");
    let entries = || submission(vec![office("X", 30)]);

    assert!(ts.submit_day("A", date("2025-02-28"), entries(), today).await.is_ok());
    assert!(matches!(
      ts.submit_day("A", date("2025-02-27"), entries(), today).await,
      Err(Error::OutsideSubmissionWindow { window_days: 1, .. })
    ));
    assert!(matches!(
      ts.submit_day("A", date("2025-03-02"), entries(), today).await,
      Err(Error::OutsideSubmissionWindow { .. })
    ));

    let open = sheet(SubmissionRules { window_days: None, ..Default::default() });
    assert!(open.submit_day("A", date("2020-01-01"), entries(), today).await.is_ok());
  }

  #[tokio::test]
  async fn submission_can_flag_the_day() {
    let ts = sheet(SubmissionRules::default());
    let today = date("2025-01-02");
    let sub = DaySubmission {
      status: StatusUpdate { sick: Some(true), ..Default::default() },
      ..Default::default()
    };
    let day = ts.submit_day("A", today, sub, today).await.unwrap();
    assert_eq!(day.status(), DayStatus::Sick);
  }

  #[test]
  fn submission_reads_product_field_names() {
    let sub: DaySubmission = serde_json::from_value(json!({
      "attività": [{ "tipo": "bnb", "nome": "Casa", "minuti": "40" }],
      "riposo": true
    }))
    .unwrap();
    assert_eq!(sub.activities[0].minutes, 40);
    assert_eq!(sub.status.rest_day, Some(true));
    assert_eq!(sub.status.sick, None);
  }

  // ─── Admin ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_overwrite_bypasses_the_guards() {
    let ts = sheet(SubmissionRules::default());
    let day = date("2024-06-01");
    ts.set_status("A", day, StatusUpdate { sick: Some(true), ..Default::default() })
      .await
      .unwrap();
    let record = ts
      .overwrite_activities("A", day, vec![office("X", 10), office(" ", 99)])
      .await
      .unwrap();
    assert_eq!(record.activities.len(), 1);
    assert!(record.sick);
  }

  #[tokio::test]
  async fn blank_employee_is_rejected() {
    let ts = sheet(SubmissionRules::default());
    assert!(matches!(
      ts.day("  ", date("2025-01-01")).await,
      Err(Error::MissingField("employee"))
    ));
  }

  // ─── Reports ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn month_report_and_history() {
    let ts = sheet(SubmissionRules { window_days: None, ..Default::default() });
    let today = date("2025-01-31");
    ts.set_status("A", date("2025-01-01"), StatusUpdate { sick: Some(true), ..Default::default() })
      .await
      .unwrap();
    ts.submit_day("A", date("2025-01-02"), submission(vec![office("X", 480)]), today)
      .await
      .unwrap();
    ts.set_status("A", date("2025-01-03"), StatusUpdate { rest_day: Some(true), ..Default::default() })
      .await
      .unwrap();
    ts.submit_day("A", date("2025-02-01"), submission(vec![office("X", 60)]), today)
      .await
      .unwrap();

    let report = ts.month_report("A", 2025, 1, None).await.unwrap();
    assert_eq!(report.summary.decimal_hours, 8.0);
    assert_eq!(report.summary.sick_days, 1);
    assert_eq!(report.summary.rest_days, 1);
    assert_eq!(report.days.len(), 31);

    let history = ts.history("A").await.unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, ["2025-02-01", "2025-01-03", "2025-01-02", "2025-01-01"]);
  }

  #[tokio::test]
  async fn all_employees_includes_idle_ones() {
    let ts = sheet(SubmissionRules { window_days: None, ..Default::default() });
    ts.update_reference("employees", json!(["Zeno", { "name": "anna" }]))
      .await
      .unwrap();
    let today = date("2025-01-31");
    ts.submit_day("Zeno", date("2025-01-10"), submission(vec![office("X", 90)]), today)
      .await
      .unwrap();

    let all = ts.all_employees_month(2025, 1, None).await.unwrap();
    let names: Vec<_> = all.iter().map(|e| e.employee.as_str()).collect();
    assert_eq!(names, ["anna", "Zeno"]);
    assert_eq!(all[0].report.summary.decimal_hours, 0.0);
    assert_eq!(all[1].report.summary.decimal_hours, 1.5);

    let book = ts.workbook(2025, 1).await.unwrap();
    assert_eq!(book.sheets.len(), 2);
    assert_eq!(book.sheets[1].total_hours, 1.5);
  }

  // ─── Reference data ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn reference_writes_invalidate_the_cache() {
    let ts = sheet(SubmissionRules::default());
    ts.update_reference("uffici", json!(["A|30"])).await.unwrap();
    assert_eq!(ts.catalog(ActivityCategory::Uffici).await.unwrap().len(), 1);

    ts.update_reference("uffici", json!(["A|30", "B|15"])).await.unwrap();
    let catalog = ts.catalog(ActivityCategory::Uffici).await.unwrap();
    assert_eq!(catalog[1], CatalogActivity { name: "B".into(), minutes: 15 });

    assert!(ts.catalog(ActivityCategory::Pst).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn read_during_a_reference_write_is_not_cached_stale() {
    let ts = slow_sheet(SubmissionRules::default());
    ts.update_reference("employees", json!(["Anna"])).await.unwrap();

    let (written, read) = tokio::join!(
      ts.update_reference("employees", json!(["Anna", "Bruno"])),
      ts.employees(),
    );
    written.unwrap();
    read.unwrap();

    let names: Vec<_> = ts.employees().await.unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["Anna", "Bruno"]);
  }

  #[tokio::test]
  async fn apartments_only_for_known_groups() {
    let ts = sheet(SubmissionRules::default());
    ts.update_reference("molino", json!([{ "nome": "M1", "ospiti": 2 }]))
      .await
      .unwrap();
    assert_eq!(ts.apartments("molino").await.unwrap()[0].ospiti, 2);
    assert!(matches!(ts.apartments("garage").await, Err(Error::UnknownCategory(_))));
  }

  // ─── Tickets ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tickets_round_trip_with_dotted_names() {
    let ts = sheet(SubmissionRules::default());
    let day = date("2025-05-05");
    let now = Utc::now();
    ts.save_ticket(day, "B&B.Mare", BnbTicket::with_checkouts("Anna", 2), now)
      .await
      .unwrap();
    assert!(matches!(
      ts.save_ticket(day, "B&B.Mare", BnbTicket::default(), now).await,
      Err(Error::MissingField("dip1"))
    ));

    let tickets = ts.tickets(day).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].bnb, "B&B.Mare");
    assert_eq!(tickets[0].ticket.sporco.federa, 8);
    assert_eq!(tickets[0].ticket.timestamp, Some(now));
  }
}
