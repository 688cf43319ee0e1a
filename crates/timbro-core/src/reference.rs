//! Reference data kept in the `Data` collection: the employee roster, the
//! activity catalogs, BnB names and apartment descriptions.
//!
//! Every reference document holds its payload under a key equal to its own
//! id, e.g. document `uffici` is `{"uffici": ["Studio Rossi|45", ...]}`.

use std::{
  collections::HashMap,
  fmt,
  str::FromStr,
  sync::{PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
  Error,
  activity::{coerce_minutes, value_as_decimal},
};

pub const EMPLOYEES_DOC: &str = "employees";
pub const BNB_NAMES_DOC: &str = "bnbNomi";
pub const APARTMENT_GROUPS: [&str; 4] = ["irene", "cerrano", "lorenza", "molino"];

// ─── Documents ───────────────────────────────────────────────────────────────

/// One document of the `Data` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDocument {
  pub id:   String,
  /// The payload stored under the key `id`; `Null` if absent.
  pub data: Value,
}

impl ReferenceDocument {
  /// Extract the payload from a stored document body.
  pub fn from_body(id: impl Into<String>, body: &Value) -> Self {
    let id = id.into();
    let data = body.get(&id).cloned().unwrap_or(Value::Null);
    Self { id, data }
  }

  /// The document body to store: `{ id: data }`.
  pub fn to_body(&self) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(self.id.clone(), self.data.clone());
    Value::Object(body)
  }

  fn items(&self) -> &[Value] {
    match &self.data {
      Value::Array(items) => items,
      _ => &[],
    }
  }
}

// ─── Employees ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub name: String,
}

/// Roster entries may be bare names or objects with a `name`; any other
/// field on the object (login passwords included) is discarded.
pub fn parse_employees(doc: &ReferenceDocument) -> Vec<Employee> {
  doc
    .items()
    .iter()
    .filter_map(|item| {
      let name = match item {
        Value::String(s) => s.trim(),
        Value::Object(o) => o.get("name").and_then(Value::as_str).unwrap_or("").trim(),
        _ => "",
      };
      if name.is_empty() {
        warn!(doc = %doc.id, ?item, "ignoring roster entry without a name");
        return None;
      }
      Some(Employee { name: name.to_owned() })
    })
    .collect()
}

/// Names from a list of strings or `{name}` objects, e.g. `bnbNomi`.
pub fn parse_names(doc: &ReferenceDocument) -> Vec<String> {
  parse_employees(doc).into_iter().map(|e| e.name).collect()
}

// ─── Activity catalogs ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
  Uffici,
  Appartamenti,
  Bnb,
  Pst,
}

impl ActivityCategory {
  pub const ALL: [Self; 4] = [Self::Uffici, Self::Appartamenti, Self::Bnb, Self::Pst];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Uffici => "uffici",
      Self::Appartamenti => "appartamenti",
      Self::Bnb => "bnb",
      Self::Pst => "pst",
    }
  }

  /// Reference document holding the catalog. `pst` activities are free text.
  pub fn catalog_doc(self) -> Option<&'static str> {
    match self {
      Self::Pst => None,
      other => Some(other.as_str()),
    }
  }
}

impl fmt::Display for ActivityCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ActivityCategory {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownCategory(s.to_owned()))
  }
}

/// A predefined activity offered for selection, with its nominal minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogActivity {
  pub name:    String,
  pub minutes: u32,
}

impl CatalogActivity {
  /// Parse `"name|minutes"` or `{name|nome, minutes|minuti}`.
  pub fn from_value(item: &Value) -> Option<Self> {
    let (name, minutes) = match item {
      Value::String(s) => {
        let (name, minutes) = s.split_once('|').unwrap_or((s.as_str(), ""));
        (name.trim().to_owned(), coerce_minutes(&Value::from(minutes)))
      }
      Value::Object(o) => {
        let name = o.get("name").or_else(|| o.get("nome"));
        let minutes = o.get("minutes").or_else(|| o.get("minuti"));
        let name = match name {
          Some(Value::String(s)) => s.trim().to_owned(),
          Some(Value::Number(n)) => n.to_string(),
          _ => String::new(),
        };
        (name, minutes.map_or(0, coerce_minutes))
      }
      _ => return None,
    };
    (!name.is_empty()).then_some(Self { name, minutes })
  }
}

pub fn parse_catalog(doc: &ReferenceDocument) -> Vec<CatalogActivity> {
  doc
    .items()
    .iter()
    .filter_map(|item| {
      let parsed = CatalogActivity::from_value(item);
      if parsed.is_none() {
        warn!(doc = %doc.id, ?item, "ignoring unusable catalog item");
      }
      parsed
    })
    .collect()
}

// ─── Apartments ──────────────────────────────────────────────────────────────

/// Description of one apartment in a group such as `irene` or `molino`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
  pub nome:         String,
  pub indirizzo:    String,
  pub composizione: Vec<String>,
  pub ospiti:       u32,
  pub ore:          f64,
  pub note:         Vec<String>,
  pub mappa:        String,
}

impl Apartment {
  pub fn from_value(item: &Value) -> Option<Self> {
    let o = item.as_object()?;
    let text = |key: &str| match o.get(key) {
      Some(Value::String(s)) => s.trim().to_owned(),
      Some(Value::Number(n)) => n.to_string(),
      _ => String::new(),
    };
    let ore = o
      .get("ore")
      .and_then(value_as_decimal)
      .filter(|f| f.is_finite() && *f > 0.0)
      .unwrap_or(0.0);
    Some(Self {
      nome: text("nome"),
      indirizzo: text("indirizzo"),
      composizione: lines(o.get("composizione")),
      ospiti: o.get("ospiti").map_or(0, coerce_minutes),
      ore,
      note: lines(o.get("note")),
      mappa: text("mappa"),
    })
  }
}

/// Arrays are kept item by item, text is split on line breaks. Blank lines
/// are dropped either way.
fn lines(value: Option<&Value>) -> Vec<String> {
  let raw: Vec<String> = match value {
    Some(Value::Array(items)) => items
      .iter()
      .map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      })
      .collect(),
    Some(Value::String(s)) => s.lines().map(str::to_owned).collect(),
    _ => Vec::new(),
  };
  raw
    .into_iter()
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .collect()
}

pub fn parse_apartments(doc: &ReferenceDocument) -> Vec<Apartment> {
  doc.items().iter().filter_map(Apartment::from_value).collect()
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Reference documents already fetched from the store, keyed by id.
///
/// Owned by one [`Timesheet`](crate::service::Timesheet). Every write bumps
/// a generation counter; a document read from the store is only cached if
/// no write happened between the read and the insert.
#[derive(Debug, Default)]
pub struct ReferenceCache {
  state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
  docs:       HashMap<String, ReferenceDocument>,
  generation: u64,
}

impl ReferenceCache {
  pub fn new() -> Self { Self::default() }

  /// Take this before reading from the store and hand it to [`insert`](Self::insert).
  pub fn generation(&self) -> u64 {
    self.state.read().unwrap_or_else(PoisonError::into_inner).generation
  }

  pub fn get(&self, id: &str) -> Option<ReferenceDocument> {
    self
      .state
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .docs
      .get(id)
      .cloned()
  }

  /// Cache `doc`, read at `generation`. Returns `false` and caches nothing
  /// if the cache was invalidated since.
  pub fn insert(&self, doc: ReferenceDocument, generation: u64) -> bool {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    if state.generation != generation {
      return false;
    }
    state.docs.insert(doc.id.clone(), doc);
    true
  }

  /// Call after the store write has completed.
  pub fn invalidate(&self, id: &str) {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    state.docs.remove(id);
    state.generation += 1;
  }
}
