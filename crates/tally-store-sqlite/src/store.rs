//! [`SqliteStore`] — the SQLite implementation of [`HabitStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::OptionalExtension as _;
use tally_core::{
  habit::{Habit, HabitId},
  store::HabitStore,
};

use crate::{
  Result,
  encode::{EncodedCompletion, RawCompletion, RawHabit, encode_habit, encode_uuid},
  schema::SCHEMA,
};

const HABIT_COLUMNS: &str = "habit_id, name, description, emoji, frequency, reminder_time,
   current_streak, longest_streak, created_at, updated_at";

fn raw_habit(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHabit> {
  Ok(RawHabit {
    habit_id:       row.get(0)?,
    name:           row.get(1)?,
    description:    row.get(2)?,
    emoji:          row.get(3)?,
    frequency:      row.get(4)?,
    reminder_time:  row.get(5)?,
    current_streak: row.get(6)?,
    longest_streak: row.get(7)?,
    created_at:     row.get(8)?,
    updated_at:     row.get(9)?,
  })
}

fn raw_completion(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCompletion> {
  Ok(RawCompletion {
    habit_id:     row.get(0)?,
    day:          row.get(1)?,
    note:         row.get(2)?,
    completed_at: row.get(3)?,
  })
}

fn insert_completions(
  tx: &rusqlite::Transaction<'_>,
  habit_id: &str,
  completions: &[EncodedCompletion],
) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(
    "INSERT INTO completions (habit_id, day, note, completed_at) VALUES (?1, ?2, ?3, ?4)",
  )?;
  for c in completions {
    stmt.execute(rusqlite::params![habit_id, c.day, c.note, c.completed_at])?;
  }
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally habit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  async fn insert_habit(&self, habit: Habit) -> Result<()> {
    let (row, completions) = encode_habit(&habit)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO habits (
             habit_id, name, description, emoji, frequency, reminder_time,
             current_streak, longest_streak, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.habit_id,
            row.name,
            row.description,
            row.emoji,
            row.frequency,
            row.reminder_time,
            row.current_streak,
            row.longest_streak,
            row.created_at,
            row.updated_at,
          ],
        )?;
        insert_completions(&tx, &row.habit_id, &completions)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
    let id_str = encode_uuid(id);

    let raw: Option<(RawHabit, Vec<RawCompletion>)> = self
      .conn
      .call(move |conn| {
        let habit = conn
          .query_row(
            &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE habit_id = ?1"),
            rusqlite::params![id_str],
            raw_habit,
          )
          .optional()?;

        let Some(habit) = habit else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT habit_id, day, note, completed_at FROM completions
           WHERE habit_id = ?1 ORDER BY day",
        )?;
        let completions = stmt
          .query_map(rusqlite::params![id_str], raw_completion)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((habit, completions)))
      })
      .await?;

    raw
      .map(|(habit, completions)| habit.into_habit(completions))
      .transpose()
  }

  async fn list_habits(&self) -> Result<Vec<Habit>> {
    let (habits, completions): (Vec<RawHabit>, Vec<RawCompletion>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at DESC"
        ))?;
        let habits = stmt
          .query_map([], raw_habit)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT habit_id, day, note, completed_at FROM completions ORDER BY habit_id, day",
        )?;
        let completions = stmt
          .query_map([], raw_completion)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((habits, completions))
      })
      .await?;

    let mut by_habit: HashMap<String, Vec<RawCompletion>> = HashMap::new();
    for c in completions {
      by_habit.entry(c.habit_id.clone()).or_default().push(c);
    }

    habits
      .into_iter()
      .map(|h| {
        let completions = by_habit.remove(&h.habit_id).unwrap_or_default();
        h.into_habit(completions)
      })
      .collect()
  }

  async fn put_habit(&self, habit: Habit) -> Result<bool> {
    let (row, completions) = encode_habit(&habit)?;

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE habits SET
             name = ?2, description = ?3, emoji = ?4, frequency = ?5,
             reminder_time = ?6, current_streak = ?7, longest_streak = ?8,
             updated_at = ?9
           WHERE habit_id = ?1",
          rusqlite::params![
            row.habit_id,
            row.name,
            row.description,
            row.emoji,
            row.frequency,
            row.reminder_time,
            row.current_streak,
            row.longest_streak,
            row.updated_at,
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM completions WHERE habit_id = ?1",
          rusqlite::params![row.habit_id],
        )?;
        insert_completions(&tx, &row.habit_id, &completions)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(found)
  }

  async fn delete_habit(&self, id: HabitId) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        // Completions go with it via ON DELETE CASCADE.
        let n = conn.execute(
          "DELETE FROM habits WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }
}
