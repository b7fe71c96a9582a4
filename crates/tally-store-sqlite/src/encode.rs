//! Encoding and decoding helpers between Tally domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, days as `YYYY-MM-DD`, and the
//! frequency as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tally_core::{
  day::DayKey,
  habit::{CompletionRecord, Frequency, Habit, HabitAttributes, ReminderTime},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_counter(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::CounterRange(n))
}

// ─── Write side ──────────────────────────────────────────────────────────────

/// A `habits` row ready to bind.
pub struct EncodedHabit {
  pub habit_id:       String,
  pub name:           String,
  pub description:    Option<String>,
  pub emoji:          Option<String>,
  pub frequency:      String,
  pub reminder_time:  Option<String>,
  pub current_streak: i64,
  pub longest_streak: i64,
  pub created_at:     String,
  pub updated_at:     String,
}

/// A `completions` row ready to bind (the habit id is bound separately).
pub struct EncodedCompletion {
  pub day:          String,
  pub note:         Option<String>,
  pub completed_at: Option<String>,
}

pub fn encode_habit(habit: &Habit) -> Result<(EncodedHabit, Vec<EncodedCompletion>)> {
  let attrs = &habit.attributes;
  let row = EncodedHabit {
    habit_id:       encode_uuid(habit.habit_id),
    name:           attrs.name.clone(),
    description:    attrs.description.clone(),
    emoji:          attrs.emoji.clone(),
    frequency:      serde_json::to_string(&attrs.frequency)?,
    reminder_time:  attrs.reminder_time.map(|t| t.to_string()),
    current_streak: i64::from(habit.current_streak),
    longest_streak: i64::from(habit.longest_streak),
    created_at:     encode_dt(habit.created_at),
    updated_at:     encode_dt(habit.updated_at),
  };

  let completions = habit
    .completions
    .values()
    .map(|r| EncodedCompletion {
      day:          r.day.to_string(),
      note:         r.note.clone(),
      completed_at: r.completed_at.map(encode_dt),
    })
    .collect();

  Ok((row, completions))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:       String,
  pub name:           String,
  pub description:    Option<String>,
  pub emoji:          Option<String>,
  pub frequency:      String,
  pub reminder_time:  Option<String>,
  pub current_streak: i64,
  pub longest_streak: i64,
  pub created_at:     String,
  pub updated_at:     String,
}

/// Raw values read directly from a `completions` row.
pub struct RawCompletion {
  pub habit_id:     String,
  pub day:          String,
  pub note:         Option<String>,
  pub completed_at: Option<String>,
}

impl RawCompletion {
  pub fn into_record(self) -> Result<CompletionRecord> {
    Ok(CompletionRecord {
      day:          self.day.parse::<DayKey>()?,
      note:         self.note,
      completed_at: self.completed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

impl RawHabit {
  /// Assemble a habit from its row and its completion rows.
  pub fn into_habit(self, completions: Vec<RawCompletion>) -> Result<Habit> {
    let frequency: Frequency = serde_json::from_str(&self.frequency)?;
    let reminder_time = self
      .reminder_time
      .as_deref()
      .map(str::parse::<ReminderTime>)
      .transpose()?;

    let completions = completions
      .into_iter()
      .map(|raw| raw.into_record().map(|r| (r.day, r)))
      .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(Habit {
      habit_id: decode_uuid(&self.habit_id)?,
      attributes: HabitAttributes {
        name: self.name,
        description: self.description,
        emoji: self.emoji,
        frequency,
        reminder_time,
      },
      completions,
      current_streak: decode_counter(self.current_streak)?,
      longest_streak: decode_counter(self.longest_streak)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
