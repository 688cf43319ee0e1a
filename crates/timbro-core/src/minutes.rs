//! Effective-minute arithmetic and the two hour representations.
//!
//! Sums are always taken over unrounded per-entry values. Rounding happens
//! once, at the reporting step, in one of two independent ways:
//!
//! - [`decimal_hours`] divides the raw sum by 60 and rounds to `decimals`
//!   places. This is the canonical figure for reports and exports.
//! - [`clock_time`] rounds the raw sum to whole minutes first and then splits
//!   it into `H:MM`.
//!
//! The two can disagree at the rounding boundary; both are kept as they are.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityEntry;

/// Sum of `(minutes * multiplier) / people` over `entries`.
pub fn total_effective_minutes<'a, I>(entries: I) -> f64
where
  I: IntoIterator<Item = &'a ActivityEntry>,
{
  entries
    .into_iter()
    .map(ActivityEntry::effective_minutes)
    .sum()
}

/// `round(total_minutes / 60, decimals)`.
pub fn decimal_hours(total_minutes: f64, decimals: u32) -> f64 {
  let scale = 10_f64.powi(decimals.min(15) as i32);
  let hours = (total_minutes / 60.0 * scale).round() / scale;
  // Normalise -0.0 so reports never print a signed zero.
  if hours == 0.0 { 0.0 } else { hours }
}

/// [`decimal_hours`] with the two places used everywhere in reports.
pub fn decimal_hours_2(total_minutes: f64) -> f64 { decimal_hours(total_minutes, 2) }

// ─── Clock format ────────────────────────────────────────────────────────────

/// A whole-minute duration split into hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
  pub hours:   u64,
  pub minutes: u8,
}

impl fmt::Display for ClockTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{:02}", self.hours, self.minutes)
  }
}

/// Round the raw minute sum to the nearest integer, then split into `H:MM`.
pub fn clock_time(total_minutes: f64) -> ClockTime {
  let rounded = if total_minutes.is_finite() && total_minutes > 0.0 {
    total_minutes.round() as u64
  } else {
    0
  };
  ClockTime {
    hours:   rounded / 60,
    minutes: (rounded % 60) as u8,
  }
}
