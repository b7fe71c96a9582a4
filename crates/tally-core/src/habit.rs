//! Habit and completion record types.
//!
//! A [`Habit`] exclusively owns its [`CompletionRecord`]s. Records are keyed
//! by [`DayKey`], so a habit holds at most one record per calendar day.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, day::DayKey, streak::StreakState};

pub type HabitId = Uuid;

/// Maximum length of a habit name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// Maximum length of a completion note, in characters.
pub const MAX_NOTE_CHARS: usize = 200;

// ─── Attributes ──────────────────────────────────────────────────────────────

/// How often the user intends to perform the habit. Informational only; streaks
/// are computed from completion days regardless of the declared frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
  #[default]
  Daily,
  Weekly,
  Custom { days: Vec<Weekday> },
}

/// A reminder time of day, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
  pub fn time(self) -> NaiveTime { self.0 }
}

impl FromStr for ReminderTime {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
      .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
      .map(Self)
      .map_err(|_| Error::InvalidTime(s.to_owned()))
  }
}

impl TryFrom<String> for ReminderTime {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<ReminderTime> for String {
  fn from(t: ReminderTime) -> Self { t.to_string() }
}

impl fmt::Display for ReminderTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format("%H:%M"))
  }
}

/// The user-editable description of a habit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitAttributes {
  pub name:          String,
  #[serde(default)]
  pub description:   Option<String>,
  /// A display glyph, typically a single emoji.
  #[serde(default)]
  pub emoji:         Option<String>,
  #[serde(default)]
  pub frequency:     Frequency,
  #[serde(default)]
  pub reminder_time: Option<ReminderTime>,
}

impl HabitAttributes {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  /// Trim text fields, drop blank optionals, and check the name.
  pub fn validate(mut self) -> Result<Self> {
    self.name = self.name.trim().to_owned();
    if self.name.is_empty() {
      return Err(Error::EmptyName);
    }
    if self.name.chars().count() > MAX_NAME_CHARS {
      return Err(Error::NameTooLong { max: MAX_NAME_CHARS });
    }
    self.description = non_blank(self.description);
    self.emoji = non_blank(self.emoji);
    Ok(self)
  }
}

/// A partial update to [`HabitAttributes`]. `None` leaves a field unchanged;
/// an empty string clears an optional text field.
///
/// `reminder_time` distinguishes an absent field (`None`, unchanged) from an
/// explicit `null` (`Some(None)`, cleared).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitPatch {
  pub name:          Option<String>,
  pub description:   Option<String>,
  pub emoji:         Option<String>,
  pub frequency:     Option<Frequency>,
  #[serde(default, deserialize_with = "present")]
  pub reminder_time: Option<Option<ReminderTime>>,
}

/// Deserialise a field that is present in the input, keeping `null` as
/// `Some(None)`. Absent fields fall back to `#[serde(default)]`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: serde::Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl HabitPatch {
  /// Apply to `attrs` and re-validate the result.
  pub fn apply(self, attrs: &HabitAttributes) -> Result<HabitAttributes> {
    let mut next = attrs.clone();
    if let Some(name) = self.name {
      next.name = name;
    }
    if let Some(description) = self.description {
      next.description = Some(description);
    }
    if let Some(emoji) = self.emoji {
      next.emoji = Some(emoji);
    }
    if let Some(frequency) = self.frequency {
      next.frequency = frequency;
    }
    if let Some(reminder_time) = self.reminder_time {
      next.reminder_time = reminder_time;
    }
    next.validate()
  }
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ─── CompletionRecord ────────────────────────────────────────────────────────

/// A habit marked complete on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
  pub day:          DayKey,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:         Option<String>,
  /// Wall-clock moment the day was marked; informational only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
  /// Build a record, rejecting notes over [`MAX_NOTE_CHARS`]. A blank note is
  /// stored as no note.
  pub fn new(
    day: DayKey,
    note: Option<String>,
    completed_at: Option<DateTime<Utc>>,
  ) -> Result<Self> {
    let note = note.filter(|n| !n.trim().is_empty());
    if let Some(n) = &note
      && n.chars().count() > MAX_NOTE_CHARS
    {
      return Err(Error::NoteTooLong { max: MAX_NOTE_CHARS });
    }
    Ok(Self { day, note, completed_at })
  }
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A habit together with its completion history and cached streak counters.
///
/// `current_streak` and `longest_streak` are derived; they are only ever
/// written by [`crate::toggle::toggle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:       HabitId,
  #[serde(flatten)]
  pub attributes:     HabitAttributes,
  #[serde(with = "completion_list")]
  pub completions:    BTreeMap<DayKey, CompletionRecord>,
  pub current_streak: u32,
  pub longest_streak: u32,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Habit {
  /// A fresh habit with no completions and zeroed counters.
  pub fn new(attributes: HabitAttributes, now: DateTime<Utc>) -> Self {
    Self {
      habit_id: Uuid::new_v4(),
      attributes,
      completions: BTreeMap::new(),
      current_streak: 0,
      longest_streak: 0,
      created_at: now,
      updated_at: now,
    }
  }

  /// Completed days in ascending order, without duplicates.
  pub fn day_keys(&self) -> Vec<DayKey> { self.completions.keys().copied().collect() }

  pub fn record(&self, day: DayKey) -> Option<&CompletionRecord> {
    self.completions.get(&day)
  }

  pub fn is_completed(&self, day: DayKey) -> bool { self.completions.contains_key(&day) }

  /// The cached counters.
  pub fn streak(&self) -> StreakState {
    StreakState {
      current: self.current_streak,
      longest: self.longest_streak,
    }
  }
}

/// Serialise the completion map as a plain list of records; each record
/// carries its own day.
mod completion_list {
  use std::collections::BTreeMap;

  use serde::{Deserialize, Deserializer, Serializer};

  use super::CompletionRecord;
  use crate::day::DayKey;

  pub fn serialize<S: Serializer>(
    map: &BTreeMap<DayKey, CompletionRecord>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.values())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<BTreeMap<DayKey, CompletionRecord>, D::Error> {
    let records = Vec::<CompletionRecord>::deserialize(deserializer)?;
    Ok(records.into_iter().map(|r| (r.day, r)).collect())
  }
}
