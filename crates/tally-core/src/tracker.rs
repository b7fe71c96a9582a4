//! [`Tracker`]: the inbound interface of the engine.
//!
//! The tracker wires the pure engine to a [`HabitStore`]. Every mutation of a
//! habit is a load, a pure transition, and a write-back, performed while
//! holding that habit's lock, so concurrent toggles on one habit cannot lose
//! updates. Different habits never share a lock.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  day::{DayKey, Moment, ReferenceZone, normalize},
  habit::{CompletionRecord, Habit, HabitAttributes, HabitId, HabitPatch},
  stats::{self, Overview},
  store::HabitStore,
  streak::{compute_current, last_completed},
  toggle::toggle,
};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// Streak counters for one habit, as of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakView {
  pub current:        u32,
  pub longest:        u32,
  pub last_completed: Option<DayKey>,
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

type HabitLock = Arc<tokio::sync::Mutex<()>>;
type LockTable = Mutex<HashMap<HabitId, HabitLock>>;

/// A claim on one habit's lock. The table entry is dropped with the last
/// outstanding lease, so the table only holds habits with work in flight.
struct LockLease<'a> {
  table: &'a LockTable,
  id:    HabitId,
  lock:  HabitLock,
}

impl LockLease<'_> {
  async fn acquire(&self) -> tokio::sync::MutexGuard<'_, ()> { self.lock.lock().await }
}

impl Drop for LockLease<'_> {
  fn drop(&mut self) {
    let mut locks = self.table.lock().unwrap_or_else(PoisonError::into_inner);
    // Leases are only handed out under the table lock, so a count of two
    // (the table and this lease) means nobody else is waiting.
    if let Some(held) = locks.get(&self.id)
      && Arc::ptr_eq(held, &self.lock)
      && Arc::strong_count(&self.lock) == 2
    {
      locks.remove(&self.id);
    }
  }
}

/// Habit operations over a store, serialised per habit.
pub struct Tracker<S> {
  store: S,
  zone:  ReferenceZone,
  clock: Arc<dyn Clock>,
  locks: LockTable,
}

impl<S: HabitStore> Tracker<S> {
  /// A tracker on the system clock.
  pub fn new(store: S, zone: ReferenceZone) -> Self {
    Self::with_clock(store, zone, Arc::new(SystemClock))
  }

  pub fn with_clock(store: S, zone: ReferenceZone, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      zone,
      clock,
      locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn zone(&self) -> ReferenceZone { self.zone }

  /// Today in the reference zone.
  pub fn today(&self) -> DayKey { self.zone.today(self.clock.now()) }

  fn lease(&self, id: HabitId) -> LockLease<'_> {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    let lock = locks.entry(id).or_default().clone();
    LockLease { table: &self.locks, id, lock }
  }

  async fn load(&self, id: HabitId) -> Result<Habit> {
    self
      .store
      .get_habit(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::HabitNotFound(id))
  }

  async fn write_back(&self, habit: Habit) -> Result<Habit> {
    let id = habit.habit_id;
    let found = self
      .store
      .put_habit(habit.clone())
      .await
      .map_err(Error::store)?;
    if !found {
      return Err(Error::HabitNotFound(id));
    }
    Ok(habit)
  }

  // ── Habits ───────────────────────────────────────────────────────────────

  /// Create a habit with an empty completion set and zeroed counters.
  pub async fn create_habit(&self, attributes: HabitAttributes) -> Result<Habit> {
    let attributes = attributes.validate()?;
    let habit = Habit::new(attributes, self.clock.now());

    self
      .store
      .insert_habit(habit.clone())
      .await
      .map_err(Error::store)?;

    info!(habit_id = %habit.habit_id, name = %habit.attributes.name, "habit created");
    Ok(habit)
  }

  pub async fn get_habit(&self, id: HabitId) -> Result<Habit> { self.load(id).await }

  /// All habits, newest first.
  pub async fn list_habits(&self) -> Result<Vec<Habit>> {
    self.store.list_habits().await.map_err(Error::store)
  }

  /// Edit a habit's attributes. Completions and counters are untouched.
  pub async fn update_habit(&self, id: HabitId, patch: HabitPatch) -> Result<Habit> {
    let lease = self.lease(id);
    let _guard = lease.acquire().await;

    let mut habit = self.load(id).await?;
    habit.attributes = patch.apply(&habit.attributes)?;
    habit.updated_at = self.clock.now();

    let habit = self.write_back(habit).await?;
    debug!(habit_id = %id, "habit updated");
    Ok(habit)
  }

  /// Delete a habit together with all of its completion records.
  pub async fn delete_habit(&self, id: HabitId) -> Result<()> {
    let lease = self.lease(id);
    let _guard = lease.acquire().await;

    let existed = self.store.delete_habit(id).await.map_err(Error::store)?;
    if !existed {
      return Err(Error::HabitNotFound(id));
    }

    info!(habit_id = %id, "habit deleted");
    Ok(())
  }

  // ── Completions ──────────────────────────────────────────────────────────

  /// Toggle completion of `date` (default: today) and return the updated
  /// habit with recomputed counters.
  pub async fn toggle_completion(
    &self,
    id: HabitId,
    date: Option<Moment>,
    note: Option<String>,
  ) -> Result<Habit> {
    let now = self.clock.now();
    let today = self.zone.today(now);
    let day = match date {
      Some(moment) => normalize(&moment, self.zone)?,
      None => today,
    };

    let lease = self.lease(id);
    let _guard = lease.acquire().await;

    let habit = self.load(id).await?;
    let toggled = toggle(habit, day, note, now, today)?;
    let habit = self.write_back(toggled.habit).await?;

    info!(
      habit_id = %id,
      %day,
      outcome = ?toggled.outcome,
      current = habit.current_streak,
      longest = habit.longest_streak,
      "completion toggled"
    );
    Ok(habit)
  }

  /// The record for one day, if the habit was completed then.
  pub async fn get_completion(
    &self,
    id: HabitId,
    date: Moment,
  ) -> Result<Option<CompletionRecord>> {
    let day = normalize(&date, self.zone)?;
    let habit = self.load(id).await?;
    Ok(habit.record(day).cloned())
  }

  /// Streak counters as of today.
  ///
  /// The cached current streak was computed at the last toggle; it is
  /// re-derived here so that days without any toggle are accounted for.
  pub async fn get_streak(&self, id: HabitId) -> Result<StreakView> {
    let habit = self.load(id).await?;
    let keys = habit.day_keys();
    let current = compute_current(&keys, self.today());

    Ok(StreakView {
      current,
      longest: habit.longest_streak.max(current),
      last_completed: last_completed(&keys),
    })
  }

  // ── Statistics ───────────────────────────────────────────────────────────

  /// Dashboard statistics over every habit, as of today.
  pub async fn overview(&self) -> Result<Overview> {
    let habits = self.list_habits().await?;
    Ok(stats::overview(&habits, self.today()))
  }
}
