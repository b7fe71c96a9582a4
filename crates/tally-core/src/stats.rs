//! Dashboard statistics derived from completion sets.
//!
//! Everything here is a pure function of the habits and today's [`DayKey`].
//! Percentages are whole numbers rounded half up, and a ratio over zero habits
//! (or zero days) is `0`.

use serde::Serialize;

use crate::{
  day::DayKey,
  habit::{Habit, HabitId},
  streak::compute_current,
};

/// Days covered by [`Overview::last_week`], ending today.
pub const WEEK_DAYS: u32 = 7;

/// Days covered by each [`HabitRate`], ending today.
pub const RATE_WINDOW_DAYS: u32 = 30;

/// Completions across all habits on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayProgress {
  pub day:        DayKey,
  pub completed:  u32,
  pub total:      u32,
  pub percentage: u32,
}

/// How often one habit was completed within the trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitRate {
  pub habit_id:       HabitId,
  pub name:           String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub emoji:          Option<String>,
  pub completed_days: u32,
  pub rate:           u32,
}

/// The dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
  pub today:              DayKey,
  pub total_habits:       u32,
  pub completed_today:    u32,
  pub today_rate:         u32,
  /// Sum of every habit's current streak.
  pub active_streak_days: u32,
  /// The highest longest streak of any habit.
  pub best_streak:        u32,
  /// Oldest day first.
  pub last_week:          Vec<DayProgress>,
  pub habit_rates:        Vec<HabitRate>,
}

/// `part` as a whole percentage of `whole`, rounded half up.
pub fn percent(part: u32, whole: u32) -> u32 {
  if whole == 0 {
    return 0;
  }
  let (part, whole) = (u64::from(part), u64::from(whole));
  u32::try_from((part * 200 + whole) / (whole * 2)).unwrap_or(u32::MAX)
}

fn count(n: usize) -> u32 { u32::try_from(n).unwrap_or(u32::MAX) }

/// The `days` calendar days ending at `today`, oldest first. Shorter near the
/// start of the representable calendar.
pub fn trailing_days(today: DayKey, days: u32) -> Vec<DayKey> {
  let mut out: Vec<DayKey> = std::iter::successors(Some(today), |d| d.pred())
    .take(days as usize)
    .collect();
  out.reverse();
  out
}

pub fn day_progress(habits: &[Habit], day: DayKey) -> DayProgress {
  let completed = count(habits.iter().filter(|h| h.is_completed(day)).count());
  let total = count(habits.len());
  DayProgress {
    day,
    completed,
    total,
    percentage: percent(completed, total),
  }
}

/// Completion rate of `habit` over the [`RATE_WINDOW_DAYS`] ending at
/// `today`. Days before the habit existed count as misses.
pub fn habit_rate(habit: &Habit, today: DayKey) -> HabitRate {
  let window = trailing_days(today, RATE_WINDOW_DAYS);
  let completed_days = match (window.first(), window.last()) {
    (Some(&start), Some(&end)) => count(habit.completions.range(start..=end).count()),
    _ => 0,
  };
  HabitRate {
    habit_id: habit.habit_id,
    name: habit.attributes.name.clone(),
    emoji: habit.attributes.emoji.clone(),
    completed_days,
    rate: percent(completed_days, RATE_WINDOW_DAYS),
  }
}

/// Summarise `habits` as of `today`.
///
/// Current streaks are re-derived against `today` rather than read from the
/// cached counters, which go stale between toggles.
pub fn overview(habits: &[Habit], today: DayKey) -> Overview {
  let total_habits = count(habits.len());
  let completed_today = day_progress(habits, today).completed;

  let (active_streak_days, best_streak) =
    habits.iter().fold((0u32, 0u32), |(sum, best), h| {
      let current = compute_current(&h.day_keys(), today);
      (
        sum.saturating_add(current),
        best.max(h.longest_streak).max(current),
      )
    });

  Overview {
    today,
    total_habits,
    completed_today,
    today_rate: percent(completed_today, total_habits),
    active_streak_days,
    best_streak,
    last_week: trailing_days(today, WEEK_DAYS)
      .into_iter()
      .map(|day| day_progress(habits, day))
      .collect(),
    habit_rates: habits.iter().map(|h| habit_rate(h, today)).collect(),
  }
}
