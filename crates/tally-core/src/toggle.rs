//! The single state transition on a habit's completion set.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Result,
  day::DayKey,
  habit::{CompletionRecord, Habit},
  streak::StreakState,
};

/// Which branch a toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
  /// The day had no record; one was inserted.
  Marked,
  /// The day had a record; it was removed.
  Unmarked,
}

/// The habit after a toggle, plus which branch was taken.
#[derive(Debug, Clone)]
pub struct Toggled {
  pub habit:   Habit,
  pub outcome: ToggleOutcome,
}

/// Mark `day` complete if it has no record, otherwise remove its record.
///
/// A `note` only applies when marking; it is discarded when un-marking.
/// Afterwards both counters are recomputed against `today`, with `longest`
/// clamped so that it never drops below the value stored before the toggle.
pub fn toggle(
  mut habit: Habit,
  day: DayKey,
  note: Option<String>,
  now: DateTime<Utc>,
  today: DayKey,
) -> Result<Toggled> {
  let outcome = if habit.completions.remove(&day).is_some() {
    ToggleOutcome::Unmarked
  } else {
    let record = CompletionRecord::new(day, note, Some(now))?;
    habit.completions.insert(day, record);
    ToggleOutcome::Marked
  };

  let state = StreakState::recompute(&habit.day_keys(), today, habit.longest_streak);
  habit.current_streak = state.current;
  habit.longest_streak = state.longest;
  habit.updated_at = now;

  Ok(Toggled { habit, outcome })
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::{Error, habit::HabitAttributes};

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap() }

  fn d(offset: i64) -> DayKey {
    DayKey::new(DayKey::from_ymd(2024, 6, 10).unwrap().date() + Duration::days(offset))
  }

  fn habit() -> Habit { Habit::new(HabitAttributes::named("Meditate"), now()) }

  fn mark(h: Habit, day: DayKey) -> Habit {
    toggle(h, day, None, now(), d(0)).unwrap().habit
  }

  #[test]
  fn marking_inserts_a_record_with_note_and_timestamp() {
    let t = toggle(habit(), d(0), Some("10 minutes".into()), now(), d(0)).unwrap();
    assert_eq!(t.outcome, ToggleOutcome::Marked);

    let record = t.habit.record(d(0)).unwrap();
    assert_eq!(record.note.as_deref(), Some("10 minutes"));
    assert_eq!(record.completed_at, Some(now()));
    assert_eq!(t.habit.streak(), StreakState { current: 1, longest: 1 });
  }

  #[test]
  fn toggling_twice_restores_the_completion_set() {
    let start = mark(mark(habit(), d(-2)), d(-1));
    let once = toggle(start.clone(), d(0), Some("note".into()), now(), d(0)).unwrap();
    let twice = toggle(once.habit, d(0), Some("ignored".into()), now(), d(0)).unwrap();

    assert_eq!(twice.outcome, ToggleOutcome::Unmarked);
    assert_eq!(twice.habit.completions, start.completions);
    assert_eq!(twice.habit.current_streak, 2);
  }

  #[test]
  fn unmarking_never_lowers_longest() {
    let h = mark(mark(mark(habit(), d(-2)), d(-1)), d(0));
    assert_eq!(h.streak(), StreakState { current: 3, longest: 3 });

    let h = toggle(h, d(-1), None, now(), d(0)).unwrap().habit;
    assert_eq!(h.streak(), StreakState { current: 1, longest: 3 });

    let h = mark(habit(), d(0));
    let h = toggle(h, d(0), None, now(), d(0)).unwrap().habit;
    assert!(h.completions.is_empty());
    assert_eq!(h.streak(), StreakState { current: 0, longest: 1 });
  }

  #[test]
  fn longest_is_monotonic_while_adding_days() {
    let mut h = habit();
    let mut previous = 0;
    for offset in [-9, -3, -8, -2, -7, -1, 0, -5] {
      h = mark(h, d(offset));
      assert!(h.longest_streak >= previous);
      assert!(h.longest_streak >= h.current_streak);
      previous = h.longest_streak;
    }
    assert_eq!(h.longest_streak, 4);
  }

  #[test]
  fn note_is_not_carried_over_an_unmark_remark_cycle() {
    let h = toggle(habit(), d(0), Some("first".into()), now(), d(0)).unwrap().habit;
    let h = toggle(h, d(0), None, now(), d(0)).unwrap().habit;
    let h = toggle(h, d(0), None, now(), d(0)).unwrap().habit;
    assert_eq!(h.record(d(0)).unwrap().note, None);
  }

  #[test]
  fn overlong_note_rejects_the_mark_and_leaves_state_alone() {
    let err = toggle(habit(), d(0), Some("x".repeat(201)), now(), d(0)).unwrap_err();
    assert!(matches!(err, Error::NoteTooLong { .. }));
  }

  #[test]
  fn overlong_note_is_irrelevant_when_unmarking() {
    let h = mark(habit(), d(0));
    let t = toggle(h, d(0), Some("x".repeat(500)), now(), d(0)).unwrap();
    assert_eq!(t.outcome, ToggleOutcome::Unmarked);
  }

  #[test]
  fn backfilling_an_old_day_updates_longest_not_current() {
    let h = mark(mark(habit(), d(-5)), d(-3));
    let h = mark(h, d(-4));
    assert_eq!(h.streak(), StreakState { current: 0, longest: 3 });
  }
}
