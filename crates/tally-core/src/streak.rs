//! Streak math over a sorted, deduplicated set of completed days.
//!
//! All functions here are pure. Callers are expected to pass keys through
//! [`crate::day::dedup_sorted`] first; a habit's completion map already
//! yields them in that shape.

use serde::{Deserialize, Serialize};

use crate::day::DayKey;

/// Length of the longest run of consecutive days anywhere in `keys`.
pub fn compute_longest(keys: &[DayKey]) -> u32 {
  let Some((first, rest)) = keys.split_first() else {
    return 0;
  };

  let mut prev = *first;
  let mut run = 1u32;
  let mut best = run;
  for &key in rest {
    run = if prev.is_followed_by(key) { run + 1 } else { 1 };
    best = best.max(run);
    prev = key;
  }
  best
}

/// Length of the run ending at the most recent completion, provided that
/// completion is `today` or the day before. Otherwise `0`.
///
/// `today` only gates whether the tail run still counts; it is never walked.
pub fn compute_current(keys: &[DayKey], today: DayKey) -> u32 {
  let Some(&last) = keys.last() else {
    return 0;
  };
  // 0 = today, -1 = yesterday; anything later than today is clock skew.
  if !matches!(today.days_until(last), -1 | 0) {
    return 0;
  }

  let mut run = 1u32;
  for pair in keys.windows(2).rev() {
    if !pair[0].is_followed_by(pair[1]) {
      break;
    }
    run += 1;
  }
  run
}

/// The most recent completed day, if any.
pub fn last_completed(keys: &[DayKey]) -> Option<DayKey> { keys.last().copied() }

// ─── StreakState ─────────────────────────────────────────────────────────────

/// The two derived counters cached alongside a habit.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct StreakState {
  pub current: u32,
  pub longest: u32,
}

impl StreakState {
  /// Recompute both counters after the completion set changed.
  ///
  /// `stored_longest` is the previously cached maximum; the result never
  /// drops below it, even when days were removed.
  pub fn recompute(keys: &[DayKey], today: DayKey, stored_longest: u32) -> Self {
    let current = compute_current(keys, today);
    let longest = stored_longest.max(compute_longest(keys)).max(current);
    Self { current, longest }
  }
}
