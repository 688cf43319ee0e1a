//! Activity entries: one unit of work logged against a day.
//!
//! Stored documents carry loosely-typed numeric fields: a value may arrive
//! as a number, a numeric string, junk, `null`, or be missing entirely.
//! [`RawActivity`] captures that shape and is converted into a strongly-typed
//! [`ActivityEntry`] the moment it is read, so nothing downstream ever sees a
//! missing or non-numeric quantity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Identity ────────────────────────────────────────────────────────────────

/// The `(name, activityType)` pair that decides whether two entries describe
/// the same logged task. Rendered as `name|activityType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for IdentityKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A sanitized activity line.
///
/// Serialises with the field names used by the stored day documents
/// (`tipo`, `nome`, `minuti`, `persone`, `moltiplicatore`). Deserialisation
/// goes through [`RawActivity`] and also accepts the English names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawActivity")]
pub struct ActivityEntry {
  /// Category tag, e.g. `uffici`, `appartamenti`, `bnb`, `pst`.
  #[serde(rename = "tipo")]
  pub activity_type: String,
  #[serde(rename = "nome")]
  pub name:          String,
  /// Nominal duration in minutes.
  #[serde(rename = "minuti")]
  pub minutes:       u32,
  /// Number of people sharing the task; always at least 1.
  #[serde(rename = "persone")]
  pub people:        u32,
  /// Difficulty/repetition weight; always strictly positive.
  #[serde(rename = "moltiplicatore")]
  pub multiplier:    f64,
}

impl ActivityEntry {
  /// A single-person, unweighted entry.
  pub fn new(
    activity_type: impl Into<String>,
    name: impl Into<String>,
    minutes: u32,
  ) -> Self {
    Self {
      activity_type: activity_type.into(),
      name: name.into(),
      minutes,
      people: 1,
      multiplier: 1.0,
    }
  }

  pub fn with_people(mut self, people: u32) -> Self {
    self.people = people.max(1);
    self
  }

  pub fn with_multiplier(mut self, multiplier: f64) -> Self {
    self.multiplier = positive_or_one(multiplier);
    self
  }

  /// `None` when either half of the identity is empty.
  pub fn identity_key(&self) -> Option<IdentityKey> {
    let name = self.name.trim();
    let kind = self.activity_type.trim();
    if name.is_empty() || kind.is_empty() {
      return None;
    }
    Some(IdentityKey(format!("{name}|{kind}")))
  }

  /// `(minutes * multiplier) / people`, unrounded.
  pub fn effective_minutes(&self) -> f64 {
    let people = f64::from(self.people.max(1));
    f64::from(self.minutes) * positive_or_one(self.multiplier) / people
  }

  /// Per-row display value. Never feed this back into a total.
  pub fn rounded_effective_minutes(&self) -> u64 {
    self.effective_minutes().round() as u64
  }
}

// ─── Raw document shape ──────────────────────────────────────────────────────

/// An activity exactly as it may appear in a stored or submitted document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActivity {
  #[serde(default, alias = "type", alias = "activityType")]
  pub tipo:           Value,
  #[serde(default, alias = "name")]
  pub nome:           Value,
  #[serde(default, alias = "minutes")]
  pub minuti:         Value,
  #[serde(default, alias = "people")]
  pub persone:        Value,
  #[serde(default, alias = "multiplier")]
  pub moltiplicatore: Value,
}

impl From<RawActivity> for ActivityEntry {
  fn from(raw: RawActivity) -> Self {
    Self {
      activity_type: coerce_text(&raw.tipo),
      name:          coerce_text(&raw.nome),
      minutes:       coerce_minutes(&raw.minuti),
      people:        coerce_people(&raw.persone),
      multiplier:    coerce_multiplier(&raw.moltiplicatore),
    }
  }
}

// ─── Coercion ────────────────────────────────────────────────────────────────

/// Missing, negative or unparseable minutes become 0.
pub fn coerce_minutes(value: &Value) -> u32 {
  value_as_integer(value)
    .filter(|n| *n > 0)
    .map_or(0, saturate_u32)
}

/// Missing, non-positive or unparseable head counts become 1.
pub fn coerce_people(value: &Value) -> u32 {
  value_as_integer(value)
    .filter(|n| *n > 0)
    .map_or(1, saturate_u32)
}

/// Missing, non-positive or unparseable multipliers become 1.
pub fn coerce_multiplier(value: &Value) -> f64 {
  value_as_decimal(value).map_or(1.0, positive_or_one)
}

fn coerce_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.trim().to_owned(),
    Value::Number(n) => n.to_string(),
    _ => String::new(),
  }
}

fn value_as_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| {
      n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
    }),
    Value::String(s) => leading_integer(s),
    _ => None,
  }
}

/// A decimal read the way multipliers are: numbers as-is, strings by prefix.
pub fn value_as_decimal(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => leading_decimal(s),
    _ => None,
  }
}

/// Integer prefix of `s`: `"45min"` → 45, `" -3"` → -3, `"abc"` → `None`.
fn leading_integer(s: &str) -> Option<i64> {
  let s = s.trim_start();
  let (negative, digits) = match s.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, s.strip_prefix('+').unwrap_or(s)),
  };
  let end = digits
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(digits.len());
  let n: i64 = digits[..end].parse().ok()?;
  Some(if negative { -n } else { n })
}

/// Decimal prefix of `s`: `"1.5x"` → 1.5, `"2,5"` → 2.
fn leading_decimal(s: &str) -> Option<f64> {
  let s = s.trim_start();
  let mut end = 0;
  let mut seen_dot = false;
  let mut seen_digit = false;
  for (i, c) in s.char_indices() {
    match c {
      '+' | '-' if i == 0 => {}
      '.' if !seen_dot => seen_dot = true,
      c if c.is_ascii_digit() => seen_digit = true,
      _ => break,
    }
    end = i + c.len_utf8();
  }
  if !seen_digit {
    return None;
  }
  s[..end].trim_end_matches('.').parse().ok()
}

fn saturate_u32(n: i64) -> u32 { u32::try_from(n).unwrap_or(u32::MAX) }

fn positive_or_one(value: f64) -> f64 {
  if value.is_finite() && value > 0.0 { value } else { 1.0 }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn parse(value: Value) -> ActivityEntry {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn reads_stored_field_names() {
    let entry = parse(json!({
      "tipo": "uffici",
      "nome": "Studio Rossi",
      "minuti": 90,
      "persone": 2,
      "moltiplicatore": 3
    }));
    assert_eq!(entry.activity_type, "uffici");
    assert_eq!(entry.name, "Studio Rossi");
    assert_eq!(entry.minutes, 90);
    assert_eq!(entry.people, 2);
    assert_eq!(entry.multiplier, 3.0);
  }

  #[test]
  fn reads_english_aliases() {
    let entry = parse(json!({
      "type": "bnb",
      "name": "Casa Blu",
      "minutes": "45",
      "people": "1",
      "multiplier": "2"
    }));
    assert_eq!(entry.activity_type, "bnb");
    assert_eq!(entry.minutes, 45);
    assert_eq!(entry.multiplier, 2.0);
  }

  #[test]
  fn missing_and_junk_numbers_take_defaults() {
    let entry = parse(json!({ "nome": "A", "tipo": "pst", "minuti": "abc", "persone": null }));
    assert_eq!(entry.minutes, 0);
    assert_eq!(entry.people, 1);
    assert_eq!(entry.multiplier, 1.0);
  }

  #[test]
  fn zero_and_negative_counts_are_clamped() {
    let entry = parse(json!({
      "minuti": -30,
      "persone": 0,
      "moltiplicatore": -2.5
    }));
    assert_eq!(entry.minutes, 0);
    assert_eq!(entry.people, 1);
    assert_eq!(entry.multiplier, 1.0);
  }

  #[test]
  fn integer_fields_use_the_numeric_prefix() {
    let entry = parse(json!({ "minuti": "45min", "persone": 2.9 }));
    assert_eq!(entry.minutes, 45);
    assert_eq!(entry.people, 2);
  }

  #[test]
  fn multiplier_keeps_decimals() {
    let entry = parse(json!({ "moltiplicatore": "1.5" }));
    assert_eq!(entry.multiplier, 1.5);
    assert_eq!(leading_decimal("2,5"), Some(2.0));
    assert_eq!(leading_decimal("."), None);
  }

  #[test]
  fn identity_key_requires_both_halves() {
    assert_eq!(
      ActivityEntry::new("uffici", "A", 10).identity_key().unwrap().as_str(),
      "A|uffici"
    );
    assert!(ActivityEntry::new("", "A", 10).identity_key().is_none());
    assert!(ActivityEntry::new("uffici", "  ", 10).identity_key().is_none());
  }

  #[test]
  fn effective_minutes_scale_and_share() {
    let entry = ActivityEntry::new("bnb", "X", 90).with_people(2).with_multiplier(3.0);
    assert_eq!(entry.effective_minutes(), 135.0);

    let third = ActivityEntry::new("uffici", "Y", 50).with_people(3);
    assert!((third.effective_minutes() - 16.666_666).abs() < 1e-4);
    assert_eq!(third.rounded_effective_minutes(), 17);
  }

  #[test]
  fn serialises_with_document_names() {
    let value = serde_json::to_value(ActivityEntry::new("uffici", "A", 30)).unwrap();
    assert_eq!(value["tipo"], "uffici");
    assert_eq!(value["nome"], "A");
    assert_eq!(value["minuti"], 30);
    assert_eq!(value["persone"], 1);
  }
}
