//! Merging a new batch of activities into a day's stored activities.
//!
//! Entries are matched by [`IdentityKey`](crate::activity::IdentityKey).
//! Stored entries keep their relative order; entries with a key not seen
//! before are appended in submission order. What happens on a key collision
//! is decided by [`MergePolicy`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activity::{ActivityEntry, IdentityKey};

/// Conflict rule for an incoming entry whose key is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
  /// The incoming entry wholly replaces the stored one.
  #[default]
  Replace,
  /// Minutes are added; people and multiplier take the incoming values.
  Accumulate,
}

/// Merge `incoming` into `previous` under `policy`.
///
/// Entries missing a name or an activity type are dropped from both sides.
/// The result never holds two entries with the same identity key. This
/// function does not look at the day's status flags.
pub fn merge_daily_activities(
  previous: &[ActivityEntry],
  incoming: &[ActivityEntry],
  policy: MergePolicy,
) -> Vec<ActivityEntry> {
  let mut merged: Vec<ActivityEntry> = Vec::with_capacity(previous.len() + incoming.len());
  let mut index: HashMap<IdentityKey, usize> = HashMap::new();

  for entry in previous {
    let Some(key) = keyed(entry) else { continue };
    match index.get(&key) {
      // Duplicate keys already in storage collapse onto the first slot.
      Some(&slot) => merged[slot] = entry.clone(),
      None => {
        index.insert(key, merged.len());
        merged.push(entry.clone());
      }
    }
  }

  for entry in incoming {
    let Some(key) = keyed(entry) else { continue };
    match index.get(&key) {
      Some(&slot) => resolve_conflict(&mut merged[slot], entry, policy),
      None => {
        index.insert(key, merged.len());
        merged.push(entry.clone());
      }
    }
  }

  merged
}

fn resolve_conflict(existing: &mut ActivityEntry, incoming: &ActivityEntry, policy: MergePolicy) {
  match policy {
    MergePolicy::Replace => *existing = incoming.clone(),
    MergePolicy::Accumulate => {
      existing.minutes = existing.minutes.saturating_add(incoming.minutes);
      existing.people = incoming.people;
      existing.multiplier = incoming.multiplier;
    }
  }
}

fn keyed(entry: &ActivityEntry) -> Option<IdentityKey> {
  let key = entry.identity_key();
  if key.is_none() {
    warn!(
      name = %entry.name,
      activity_type = %entry.activity_type,
      "dropping activity without a complete identity"
    );
  }
  key
}

#[cfg(test)]
mod tests {
  use super::*;

  fn a(name: &str, kind: &str, minutes: u32, people: u32) -> ActivityEntry {
    ActivityEntry::new(kind, name, minutes).with_people(people)
  }

  #[test]
  fn accumulate_adds_minutes_and_overwrites_people() {
    let previous = [a("A", "uffici", 30, 1)];
    let incoming = [a("A", "uffici", 20, 2)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Accumulate);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].minutes, 50);
    assert_eq!(merged[0].people, 2);
  }

  #[test]
  fn replace_takes_the_incoming_entry() {
    let previous = [a("A", "uffici", 30, 1)];
    let incoming = [a("A", "uffici", 20, 2)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Replace);
    assert_eq!(merged, vec![incoming[0].clone()]);
  }

  #[test]
  fn empty_incoming_is_identity() {
    let previous = [a("A", "uffici", 30, 1), a("B", "bnb", 45, 2)];
    for policy in [MergePolicy::Replace, MergePolicy::Accumulate] {
      assert_eq!(merge_daily_activities(&previous, &[], policy), previous.to_vec());
    }
  }

  #[test]
  fn new_keys_append_after_previous_in_order() {
    let previous = [a("A", "uffici", 30, 1), a("B", "uffici", 10, 1)];
    let incoming = [a("C", "bnb", 5, 1), a("A", "uffici", 1, 1), a("D", "pst", 7, 1)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Replace);
    let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C", "D"]);
  }

  #[test]
  fn same_name_different_type_are_distinct() {
    let previous = [a("A", "uffici", 30, 1)];
    let incoming = [a("A", "bnb", 30, 1)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Accumulate);
    assert_eq!(merged.len(), 2);
  }

  #[test]
  fn incomplete_identities_are_dropped() {
    let previous = [a("", "uffici", 30, 1)];
    let incoming = [a("B", "", 10, 1), a("C", "pst", 10, 1)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Replace);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, "C");
  }

  #[test]
  fn duplicate_incoming_keys_collapse() {
    let incoming = [a("A", "uffici", 10, 1), a("A", "uffici", 15, 1)];
    let replaced = merge_daily_activities(&[], &incoming, MergePolicy::Replace);
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].minutes, 15);

    let summed = merge_daily_activities(&[], &incoming, MergePolicy::Accumulate);
    assert_eq!(summed.len(), 1);
    assert_eq!(summed[0].minutes, 25);
  }

  #[test]
  fn keys_stay_unique() {
    let previous = [a("A", "uffici", 30, 1), a("A", "uffici", 40, 1), a("B", "bnb", 5, 1)];
    let incoming = [a("B", "bnb", 5, 1), a("C", "pst", 5, 1)];
    let merged = merge_daily_activities(&previous, &incoming, MergePolicy::Accumulate);
    let mut keys: Vec<_> = merged.iter().filter_map(ActivityEntry::identity_key).collect();
    let before = keys.len();
    keys.sort_by(|x, y| x.as_str().cmp(y.as_str()));
    keys.dedup();
    assert_eq!(keys.len(), before);
    assert_eq!(merged.len(), 3);
  }
}
